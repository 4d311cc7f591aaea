//! Routing config validation
//!
//! Structural checks run on every load. Live checks need the project's
//! actual workflow-state options and are run on demand.

use crate::domain::StateMachine;
use crate::errors::{ConfigError, ConfigPhase};
use crate::schemas::{RoutingConfig, WorkflowState, ROUTING_CONFIG_VERSION};

/// Source of the workflow-state names a project board actually offers
pub trait WorkflowStateOptions {
    fn workflow_state_names(&self) -> Vec<String>;

    fn has_workflow_state(&self, name: &str) -> bool {
        self.workflow_state_names().iter().any(|n| n == name)
    }
}

impl WorkflowStateOptions for StateMachine {
    fn workflow_state_names(&self) -> Vec<String> {
        self.definition()
            .states
            .keys()
            .map(|s| s.to_string())
            .collect()
    }

    fn has_workflow_state(&self, name: &str) -> bool {
        name.parse::<WorkflowState>()
            .map(|s| self.state_info(s).is_some())
            .unwrap_or(false)
    }
}

impl WorkflowStateOptions for Vec<String> {
    fn workflow_state_names(&self) -> Vec<String> {
        self.clone()
    }

    fn has_workflow_state(&self, name: &str) -> bool {
        self.iter().any(|n| n == name)
    }
}

/// Check version, match criteria and actions; returns every problem found.
pub fn validate_routing_config(config: &RoutingConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    let schema_error = |path: String, message: String| {
        ConfigError::new(ConfigPhase::SchemaValidation, path, message)
    };

    if config.version != ROUTING_CONFIG_VERSION {
        errors.push(schema_error(
            "version".to_string(),
            format!(
                "unsupported version {}; expected {}",
                config.version, ROUTING_CONFIG_VERSION
            ),
        ));
    }

    for (i, rule) in config.rules.iter().enumerate() {
        let criteria = &rule.criteria;

        let has_labels = match &criteria.labels {
            Some(labels) if labels.is_empty() => {
                errors.push(schema_error(
                    format!("rules[{}].match.labels", i),
                    "labels must specify any or all".to_string(),
                ));
                false
            }
            Some(_) => true,
            None => false,
        };

        if criteria.repo.is_none() && !has_labels && criteria.issue_type.is_none() {
            errors.push(schema_error(
                format!("rules[{}].match", i),
                "match must specify at least one of repo, labels or issueType".to_string(),
            ));
        }

        if rule.action.is_empty() {
            errors.push(schema_error(
                format!("rules[{}].action", i),
                "action must specify at least one of projectNumber, projectNumbers, \
                 workflowState or labels"
                    .to_string(),
            ));
        }
    }

    errors
}

/// Check that every enabled rule's target workflow state exists on the board.
pub fn validate_routing_config_live(
    config: &RoutingConfig,
    options: &dyn WorkflowStateOptions,
) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    for (i, rule) in config.rules.iter().enumerate() {
        if !rule.enabled {
            continue;
        }
        let Some(state) = rule.action.workflow_state.as_deref() else {
            continue;
        };
        if !options.has_workflow_state(state) {
            errors.push(ConfigError::new(
                ConfigPhase::LiveValidation,
                format!("rules[{}].action.workflowState", i),
                format!(
                    "unknown workflow state \"{}\"; available: {}",
                    state,
                    options.workflow_state_names().join(", ")
                ),
            ));
        }
    }

    errors
}
