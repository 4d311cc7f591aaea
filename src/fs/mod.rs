//! File system utilities
//!
//! Provides `.ralph` path resolution and JSON/text file operations.

mod json;
mod paths;

pub use json::{read_json, read_text, write_json};
pub use paths::{
    find_project_root, get_ralph_dir, get_routing_config_path, get_state_machine_path,
    resolve_cwd, RALPH_DIR,
};
