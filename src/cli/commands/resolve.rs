//! Resolve command - Turn a requested state or intent into a concrete state

use std::path::Path;

use crate::config::load_state_machine;
use crate::errors::Result;

use super::{print_json, project_root};

/// Resolve `input` for `command`; failures carry the recovery text
pub fn run(cwd: Option<&Path>, input: &str, command: &str, json: bool) -> Result<()> {
    let machine = load_state_machine(&project_root(cwd))?;
    let resolved = machine.resolve_state(input, command)?;

    if json {
        print_json(&resolved)
    } else {
        println!("{}", resolved.resolved_state);
        Ok(())
    }
}
