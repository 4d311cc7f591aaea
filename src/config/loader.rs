//! Configuration loading
//!
//! Routing config is YAML and goes through three phases: parse, typed
//! deserialize, structural validation. The state machine table is JSON and
//! optional; without an override the embedded table is used.

use std::path::Path;

use crate::domain::{StateMachine, StateMachineDefinition};
use crate::errors::{ConfigPhase, RalphError, Result};
use crate::fs;
use crate::schemas::RoutingConfig;

use super::validation::validate_routing_config;

/// Parse and validate a routing config document.
///
/// # Errors
/// * `Config` (yaml_parse) - the text is not well-formed YAML
/// * `Config` (schema_validation) - wrong shape, unknown fields, or failed
///   structural checks; every structural problem is reported
pub fn parse_routing_config(text: &str) -> Result<RoutingConfig> {
    let value: serde_yaml::Value = serde_yaml::from_str(text)
        .map_err(|e| RalphError::config(ConfigPhase::YamlParse, "", e.to_string()))?;

    if value.is_null() {
        return Err(RalphError::config(
            ConfigPhase::SchemaValidation,
            "",
            "routing config is empty",
        ));
    }

    let config: RoutingConfig = serde_yaml::from_value(value)
        .map_err(|e| RalphError::config(ConfigPhase::SchemaValidation, "", e.to_string()))?;

    let errors = validate_routing_config(&config);
    if !errors.is_empty() {
        return Err(RalphError::Config(errors));
    }

    Ok(config)
}

/// Read and parse a routing config file.
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `Config` - See [`parse_routing_config`]
pub fn load_routing_config(path: &Path) -> Result<RoutingConfig> {
    let text = fs::read_text(path)?;
    let config = parse_routing_config(&text)?;
    tracing::debug!(
        path = %path.display(),
        rules = config.rules.len(),
        "routing config loaded"
    );
    Ok(config)
}

/// Load the project's state machine, falling back to the embedded table.
///
/// # Errors
/// * `InvalidJson` - the override exists but cannot be parsed
/// * `Config` - the override parses but is incomplete or inconsistent
pub fn load_state_machine(root: &Path) -> Result<StateMachine> {
    let path = fs::get_state_machine_path(root);
    if !path.exists() {
        return Ok(StateMachine::canonical());
    }

    let definition: StateMachineDefinition = fs::read_json(&path)?;
    let machine = StateMachine::from_definition(definition)?;
    tracing::debug!(path = %path.display(), "state machine override loaded");
    Ok(machine)
}
