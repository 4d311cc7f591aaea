//! CLI command implementations

pub mod pipeline;
pub mod resolve;
pub mod route;
pub mod states;
pub mod streams;
pub mod transition;
pub mod validate_config;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::{RalphError, Result};
use crate::fs::{find_project_root, resolve_cwd};

/// Project root for a command: nearest ancestor of the working directory with `.ralph`
fn project_root(cwd: Option<&Path>) -> PathBuf {
    find_project_root(&resolve_cwd(cwd))
}

/// Relative paths given on the command line are taken from the working directory
fn resolve_input(cwd: Option<&Path>, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        resolve_cwd(cwd).join(path)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| RalphError::wrap(e, "Failed to serialize output"))?;
    println!("{}", text);
    Ok(())
}
