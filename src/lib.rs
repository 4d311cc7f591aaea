//! Ralph engine - the deterministic core of an agent-driven issue workflow
//!
//! This library provides:
//! - The workflow state machine and semantic-intent resolution for agent commands
//! - Pipeline position detection for single issues and issue groups
//! - Work-stream clustering by shared files and in-batch blockers
//! - Declarative routing rules for incoming issues
//! - Config loading and validation from the project's `.ralph` directory

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod fs;
pub mod schemas;

// Re-export commonly used types
pub use domain::{
    detect_pipeline_position, detect_work_streams, evaluate_rules, PipelinePosition, StateMachine,
    WorkStreamDetection,
};
pub use errors::{RalphError, Result};
pub use schemas::{IssueContext, IssueFileOwnership, IssueState, RoutingConfig, WorkflowState};
