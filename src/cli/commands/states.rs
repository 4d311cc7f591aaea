//! States command - Print the active workflow state table

use std::path::Path;

use crate::config::load_state_machine;
use crate::domain::StateMachine;
use crate::errors::Result;
use crate::fs::write_json;

use super::{print_json, project_root, resolve_input};

/// Print the state table, optionally exporting it as an override template
pub fn run(cwd: Option<&Path>, json: bool, export: Option<&Path>) -> Result<()> {
    let machine = load_state_machine(&project_root(cwd))?;

    if let Some(path) = export {
        let path = resolve_input(cwd, path);
        write_json(&path, machine.definition())?;
        tracing::info!(path = %path.display(), "state table exported");
    }

    if json {
        return print_json(machine.definition());
    }

    print!("{}", render_table(&machine));
    Ok(())
}

fn render_table(machine: &StateMachine) -> String {
    let mut out = String::new();
    for (state, def) in &machine.definition().states {
        let mut flags = Vec::new();
        if def.is_lock_state {
            flags.push("lock");
        }
        if def.is_terminal {
            flags.push("terminal");
        }
        if def.requires_human_action {
            flags.push("human");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        let next = if def.allowed_transitions.is_empty() {
            "(none)".to_string()
        } else {
            def.allowed_transitions
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.push_str(&format!("{}{} -> {}\n", state, flags, next));
    }
    out
}
