//! Pipeline command - Detect the phase of an issue or group

use std::path::Path;

use crate::domain::{detect_pipeline_position, PipelinePosition};
use crate::errors::Result;
use crate::fs::read_json;
use crate::schemas::IssueState;

use super::{print_json, resolve_input};

/// More than one issue is a group; its primary defaults to the lowest number
fn position_for(issues: &[IssueState], group_primary: Option<u64>) -> PipelinePosition {
    let is_group = issues.len() > 1;
    let primary = if is_group {
        group_primary.or_else(|| issues.iter().map(|i| i.number).min())
    } else {
        group_primary
    };
    detect_pipeline_position(issues, is_group, primary)
}

pub fn run(cwd: Option<&Path>, file: &Path, group_primary: Option<u64>, json: bool) -> Result<()> {
    let issues: Vec<IssueState> = read_json(&resolve_input(cwd, file))?;
    let position = position_for(&issues, group_primary);

    if json {
        return print_json(&position);
    }

    println!("Phase: {}", position.phase);
    println!("Reason: {}", position.reason);
    println!("Remaining: {}", position.remaining_phases.join(" -> "));
    if position.is_group {
        println!(
            "Convergence: {} ({:?})",
            if position.convergence.met { "met" } else { "not met" },
            position.convergence.recommendation
        );
        for blocking in &position.convergence.blocking {
            println!(
                "  blocking #{} {} [{}]",
                blocking.number, blocking.title, blocking.workflow_state
            );
        }
    }
    let roster = &position.suggested_roster;
    println!(
        "Roster: analyst={} builder={} validator={} integrator={}",
        roster.analyst, roster.builder, roster.validator, roster.integrator
    );
    Ok(())
}
