//! Schema types for ralph-engine
//!
//! Value objects exchanged with the issue data provider and the routing
//! config source. Field names serialize in camelCase to match provider JSON.

mod issue;
mod routing;
mod state;

pub use issue::{IssueFileOwnership, IssueState};
pub use routing::{
    IssueContext, LabelMatch, MatchCriteria, RoutingAction, RoutingConfig, RoutingRule,
    ROUTING_CONFIG_VERSION,
};
pub use state::{Estimate, WorkflowState};
