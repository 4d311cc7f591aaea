//! Loading and validating project configuration from `.ralph/`

mod loader;
mod validation;

pub use loader::{load_routing_config, load_state_machine, parse_routing_config};
pub use validation::{
    validate_routing_config, validate_routing_config_live, WorkflowStateOptions,
};
