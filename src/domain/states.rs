//! Workflow state definitions
//!
//! The pipeline runs Backlog → Research → Plan → Review → Implement → Done.
//! Human Needed and Canceled sit off the main line and can be reached from
//! most states.

use serde::{Deserialize, Serialize};

use crate::schemas::WorkflowState;

/// Flags and outgoing edges for one state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDefinition {
    pub description: String,
    pub allowed_transitions: Vec<WorkflowState>,
    /// Held by exactly one worker while it runs
    #[serde(default)]
    pub is_lock_state: bool,
    #[serde(default)]
    pub is_terminal: bool,
    #[serde(default)]
    pub requires_human_action: bool,
}

fn state(description: &str, allowed_transitions: &[WorkflowState]) -> StateDefinition {
    StateDefinition {
        description: description.to_string(),
        allowed_transitions: allowed_transitions.to_vec(),
        is_lock_state: false,
        is_terminal: false,
        requires_human_action: false,
    }
}

impl StateDefinition {
    fn lock(mut self) -> Self {
        self.is_lock_state = true;
        self
    }

    fn terminal(mut self) -> Self {
        self.is_terminal = true;
        self
    }

    fn human(mut self) -> Self {
        self.requires_human_action = true;
        self
    }
}

/// Canonical definition of a state.
///
/// IMPORTANT: This is the source of truth for the transition table.
/// `data/state-machine.json` must stay equivalent to it.
pub fn canonical_state(s: WorkflowState) -> StateDefinition {
    use WorkflowState::*;

    match s {
        Backlog => state(
            "New issue awaiting triage",
            &[ResearchNeeded, ReadyForPlan, Done, Canceled, HumanNeeded],
        ),
        ResearchNeeded => state(
            "Triaged; needs investigation before planning",
            &[ResearchInProgress, ReadyForPlan, Backlog, HumanNeeded, Canceled],
        ),
        ResearchInProgress => state(
            "Research underway; locked to one analyst",
            &[ReadyForPlan, ResearchNeeded, HumanNeeded],
        )
        .lock(),
        ReadyForPlan => state(
            "Research complete; waiting for a planner",
            &[PlanInProgress, ResearchNeeded, HumanNeeded, Canceled],
        ),
        PlanInProgress => state(
            "Plan being written; locked to one planner",
            &[PlanInReview, ReadyForPlan, HumanNeeded],
        )
        .lock(),
        PlanInReview => state(
            "Plan written; waiting for approval",
            &[InProgress, ReadyForPlan, HumanNeeded, Canceled],
        )
        .human(),
        InProgress => state(
            "Implementation underway; locked to one builder",
            &[InReview, PlanInReview, HumanNeeded],
        )
        .lock(),
        InReview => state(
            "Pull request open; waiting for merge",
            &[Done, InProgress, HumanNeeded],
        ),
        Done => state("Work merged and complete", &[]).terminal(),
        Canceled => state("Abandoned; no further work", &[]).terminal(),
        HumanNeeded => state(
            "Blocked until a person intervenes",
            &[Backlog, ResearchNeeded, ReadyForPlan, InProgress, Canceled],
        )
        .human(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_have_no_transitions() {
        for s in WorkflowState::ALL {
            let def = canonical_state(s);
            if def.is_terminal {
                assert!(def.allowed_transitions.is_empty(), "{} has transitions", s);
            }
        }
    }

    #[test]
    fn test_lock_states() {
        let locks: Vec<WorkflowState> = WorkflowState::ALL
            .into_iter()
            .filter(|s| canonical_state(*s).is_lock_state)
            .collect();
        assert_eq!(
            locks,
            vec![
                WorkflowState::ResearchInProgress,
                WorkflowState::PlanInProgress,
                WorkflowState::InProgress
            ]
        );
    }

    #[test]
    fn test_human_states() {
        assert!(canonical_state(WorkflowState::HumanNeeded).requires_human_action);
        assert!(canonical_state(WorkflowState::PlanInReview).requires_human_action);
        assert!(!canonical_state(WorkflowState::InReview).requires_human_action);
    }

    #[test]
    fn test_no_self_transitions() {
        for s in WorkflowState::ALL {
            assert!(!canonical_state(s).allowed_transitions.contains(&s));
        }
    }

    #[test]
    fn test_every_live_state_can_escalate() {
        for s in WorkflowState::ALL {
            let def = canonical_state(s);
            if !def.is_terminal && s != WorkflowState::HumanNeeded {
                assert!(
                    def.allowed_transitions.contains(&WorkflowState::HumanNeeded),
                    "{} cannot escalate",
                    s
                );
            }
        }
    }
}
