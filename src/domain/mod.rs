//! Domain logic: the workflow state machine, work-stream clustering,
//! pipeline phase detection and routing rule evaluation.
//!
//! Everything here is pure. Loading definitions and configs from disk lives
//! in [`crate::config`].

mod commands;
mod pipeline;
mod routing;
mod state_machine;
mod states;
mod union_find;
mod work_streams;

// Property-based tests (compiled only in test builds)
#[cfg(test)]
mod property_tests;

pub use commands::{
    canonical_command, canonical_intent, Command, CommandDefinition, SemanticIntent,
    COMMAND_PREFIX, WILDCARD_COMMAND,
};
pub use pipeline::{
    detect_pipeline_position, detect_stream_position, suggested_roster, BlockingIssue,
    Convergence, PhaseRule, PipelinePhase, PipelinePosition, Recommendation, SuggestedRoster,
    PHASE_RULES,
};
pub use routing::{
    criteria_match, evaluate_rules, glob_to_regex, labels_match, repo_matches, MatchedRule,
    RoutingEvaluation,
};
pub use state_machine::{IntentResolution, ResolvedState, StateMachine, StateMachineDefinition};
pub use states::{canonical_state, StateDefinition};
pub use union_find::{KeyedUnionFind, NodeId};
pub use work_streams::{
    detect_work_streams, WorkStream, WorkStreamDetection, BLOCKED_BY_RATIONALE,
    EMPTY_INPUT_RATIONALE, INDEPENDENT_RATIONALE,
};
