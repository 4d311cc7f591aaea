//! Reading and writing JSON/text files
//!
//! Missing files surface as `FileNotFound`, malformed JSON as `InvalidJson`;
//! every other I/O failure passes through as `Io`.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{RalphError, Result};

/// Read a whole file as UTF-8 text.
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `Io` - Any other read failure
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RalphError::FileNotFound(path.display().to_string())
        } else {
            RalphError::Io(e)
        }
    })
}

/// Read and deserialize a JSON file.
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidJson` - If the content is not valid JSON or does not fit `T`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_text(path)?;
    serde_json::from_str(&content).map_err(|e| {
        RalphError::InvalidJson(format!("Invalid JSON in file {}: {}", path.display(), e))
    })
}

/// Write a value as pretty JSON.
///
/// Writes to a sibling temp file and renames it into place, so readers never
/// observe a partial file.
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let content =
        serde_json::to_string_pretty(data).map_err(|e| RalphError::InvalidJson(e.to_string()))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::IssueState;
    use tempfile::TempDir;

    #[test]
    fn test_read_json_file_not_found() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.json");

        let result: Result<Vec<IssueState>> = read_json(&path);
        assert!(matches!(result.unwrap_err(), RalphError::FileNotFound(_)));
    }

    #[test]
    fn test_read_json_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("issues.json");
        fs::write(&path, "[{\"number\": ").unwrap();

        let result: Result<Vec<IssueState>> = read_json(&path);
        assert!(matches!(result.unwrap_err(), RalphError::InvalidJson(_)));
    }

    #[test]
    fn test_read_issue_states() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("issues.json");
        fs::write(
            &path,
            r#"[{"number": 7, "title": "Add cache", "workflowState": "In Progress", "estimate": "M"}]"#,
        )
        .unwrap();

        let issues: Vec<IssueState> = read_json(&path).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].number, 7);
        assert!(issues[0].is_oversized());
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".ralph").join("nested").join("out.json");

        let issues = vec![IssueState::new(1, "One", "Backlog")];
        write_json(&path, &issues).unwrap();

        let back: Vec<IssueState> = read_json(&path).unwrap();
        assert_eq!(back, issues);
        assert!(!path.with_extension("json.tmp").exists());
    }
}
