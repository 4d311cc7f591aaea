//! Transition command - Check a single state transition

use std::path::Path;

use serde::Serialize;

use crate::config::load_state_machine;
use crate::domain::StateMachine;
use crate::errors::{RalphError, Result};
use crate::schemas::WorkflowState;

use super::{print_json, project_root};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransitionCheck {
    from: String,
    to: String,
    valid: bool,
    allowed: Vec<String>,
}

fn check(machine: &StateMachine, from: &str, to: &str) -> TransitionCheck {
    let allowed = from
        .parse::<WorkflowState>()
        .map(|s| {
            machine
                .allowed_transitions(s)
                .iter()
                .map(|t| t.to_string())
                .collect()
        })
        .unwrap_or_default();
    TransitionCheck {
        from: from.to_string(),
        to: to.to_string(),
        valid: machine.is_valid_transition_str(from, to),
        allowed,
    }
}

/// Validate `from -> to`; an invalid transition is reported as an error
pub fn run(cwd: Option<&Path>, from: &str, to: &str, json: bool) -> Result<()> {
    let machine = load_state_machine(&project_root(cwd))?;
    let result = check(&machine, from, to);

    if json {
        print_json(&result)?;
    } else if result.valid {
        println!("{} -> {} is allowed", from, to);
    }

    if !result.valid {
        return Err(RalphError::InvalidTransition {
            from: result.from,
            to: result.to,
            allowed: result.allowed,
        });
    }
    Ok(())
}
