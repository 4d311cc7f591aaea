//! Validate-config command - Structural and live checks of a routing config

use std::path::Path;

use serde::Serialize;

use crate::config::{
    load_routing_config, load_state_machine, validate_routing_config_live, WorkflowStateOptions,
};
use crate::errors::{RalphError, Result};
use crate::fs::{get_routing_config_path, read_json};

use super::{print_json, project_root, resolve_input};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationReport {
    path: String,
    rules: usize,
    enabled_rules: usize,
    live_checked: bool,
}

pub fn run(
    cwd: Option<&Path>,
    config: Option<&Path>,
    live: bool,
    states_file: Option<&Path>,
    json: bool,
) -> Result<()> {
    let root = project_root(cwd);
    let path = match config {
        Some(path) => resolve_input(cwd, path),
        None => get_routing_config_path(&root),
    };

    // Structural problems fail the load itself
    let routing = load_routing_config(&path)?;

    if live {
        let options: Box<dyn WorkflowStateOptions> = match states_file {
            Some(file) => {
                let names: Vec<String> = read_json(&resolve_input(cwd, file))?;
                Box::new(names)
            }
            None => Box::new(load_state_machine(&root)?),
        };
        let errors = validate_routing_config_live(&routing, options.as_ref());
        if !errors.is_empty() {
            return Err(RalphError::Config(errors));
        }
    }

    let report = ValidationReport {
        path: path.display().to_string(),
        rules: routing.rules.len(),
        enabled_rules: routing.rules.iter().filter(|r| r.enabled).count(),
        live_checked: live,
    };

    if json {
        return print_json(&report);
    }
    println!(
        "{}: valid ({} rules, {} enabled{})",
        report.path,
        report.rules,
        report.enabled_rules,
        if live { ", live states checked" } else { "" }
    );
    Ok(())
}
