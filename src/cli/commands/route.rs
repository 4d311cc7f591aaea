//! Route command - Evaluate routing rules against one issue

use std::path::Path;

use crate::config::load_routing_config;
use crate::domain::evaluate_rules;
use crate::errors::Result;
use crate::fs::{get_routing_config_path, read_json};
use crate::schemas::IssueContext;

use super::{print_json, project_root, resolve_input};

pub fn run(cwd: Option<&Path>, issue: &Path, config: Option<&Path>, json: bool) -> Result<()> {
    let config_path = match config {
        Some(path) => resolve_input(cwd, path),
        None => get_routing_config_path(&project_root(cwd)),
    };
    let config = load_routing_config(&config_path)?;
    let issue: IssueContext = read_json(&resolve_input(cwd, issue))?;

    let evaluation = evaluate_rules(&config, &issue);

    if json {
        return print_json(&evaluation);
    }

    if !evaluation.is_match() {
        println!("No routing rule matched {}", issue.repo);
        return Ok(());
    }
    for matched in &evaluation.matched_rules {
        let action = &matched.rule.action;
        let mut parts = Vec::new();
        if let Some(n) = action.project_number {
            parts.push(format!("project {}", n));
        }
        if let Some(ns) = &action.project_numbers {
            let ns: Vec<String> = ns.iter().map(|n| n.to_string()).collect();
            parts.push(format!("projects {}", ns.join(", ")));
        }
        if let Some(state) = &action.workflow_state {
            parts.push(format!("state \"{}\"", state));
        }
        if let Some(labels) = &action.labels {
            parts.push(format!("labels {}", labels.join(", ")));
        }
        println!(
            "{}: {}",
            matched.rule.display_name(matched.index),
            parts.join("; ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RalphError;
    use tempfile::TempDir;

    #[test]
    fn test_route_with_explicit_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("routing.yaml"),
            "version: 1\nrules:\n  - match: {repo: \"org/*\"}\n    action: {projectNumber: 2}\n",
        )
        .unwrap();
        std::fs::write(temp.path().join("issue.json"), r#"{"repo": "org/api"}"#).unwrap();

        run(
            Some(temp.path()),
            Path::new("issue.json"),
            Some(Path::new("routing.yaml")),
            true,
        )
        .unwrap();
    }

    #[test]
    fn test_route_without_config_file() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".ralph")).unwrap();
        std::fs::write(temp.path().join("issue.json"), r#"{"repo": "org/api"}"#).unwrap();

        let err = run(Some(temp.path()), Path::new("issue.json"), None, false).unwrap_err();
        assert!(matches!(err, RalphError::FileNotFound(_)));
    }
}
