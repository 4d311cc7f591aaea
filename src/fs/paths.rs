//! Path resolution for the `.ralph` project directory

use std::path::{Path, PathBuf};

/// Name of the per-project directory holding ralph configuration
pub const RALPH_DIR: &str = ".ralph";

/// Walk up from `start` to the nearest directory containing `.ralph`.
///
/// Returns `start` itself when no ancestor has one, so a project without
/// configuration still runs with the embedded defaults.
pub fn find_project_root(start: &Path) -> PathBuf {
    let mut current = start.to_path_buf();
    loop {
        if get_ralph_dir(&current).is_dir() {
            return current;
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => return start.to_path_buf(),
        }
    }
}

/// Resolve the working directory, optionally using an override.
pub fn resolve_cwd(cwd_option: Option<&Path>) -> PathBuf {
    match cwd_option {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

pub fn get_ralph_dir(root: &Path) -> PathBuf {
    root.join(RALPH_DIR)
}

/// `.ralph/routing.yaml`
pub fn get_routing_config_path(root: &Path) -> PathBuf {
    get_ralph_dir(root).join("routing.yaml")
}

/// `.ralph/state-machine.json`, the optional transition table override
pub fn get_state_machine_path(root: &Path) -> PathBuf {
    get_ralph_dir(root).join("state-machine.json")
}
