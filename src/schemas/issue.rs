//! Issue snapshot schemas supplied by the project data provider

use serde::{Deserialize, Deserializer, Serialize};

use super::state::{Estimate, WorkflowState};

/// Point-in-time view of an issue used for pipeline detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueState {
    pub number: u64,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,

    /// Raw board column name; may be empty or unrecognized
    #[serde(default, deserialize_with = "null_as_empty")]
    pub workflow_state: String,

    #[serde(default)]
    pub estimate: Option<Estimate>,

    #[serde(default)]
    pub sub_issue_count: u32,
}

/// Providers send `null` for an unset field; treat it as the empty string
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl IssueState {
    pub fn new(number: u64, title: impl Into<String>, workflow_state: impl Into<String>) -> Self {
        IssueState {
            number,
            title: title.into(),
            workflow_state: workflow_state.into(),
            estimate: None,
            sub_issue_count: 0,
        }
    }

    pub fn with_estimate(mut self, estimate: Option<Estimate>) -> Self {
        self.estimate = estimate;
        self
    }

    pub fn with_sub_issue_count(mut self, count: u32) -> Self {
        self.sub_issue_count = count;
        self
    }

    /// Parsed workflow state, or None when the provider sent an unknown name
    pub fn state(&self) -> Option<WorkflowState> {
        self.workflow_state.parse().ok()
    }

    /// Whether the issue is in the given state
    pub fn is_in(&self, state: WorkflowState) -> bool {
        self.state() == Some(state)
    }

    pub fn is_oversized(&self) -> bool {
        self.estimate.map(|e| e.is_oversized()).unwrap_or(false)
    }

    /// Oversized and not yet broken into sub-issues
    pub fn needs_split(&self) -> bool {
        self.is_oversized() && self.sub_issue_count == 0
    }
}

/// Files an issue is expected to touch, plus its blockers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFileOwnership {
    pub number: u64,

    #[serde(default)]
    pub files: Vec<String>,

    /// Issue numbers that must land before this one
    #[serde(default)]
    pub blocked_by: Vec<u64>,
}

impl IssueFileOwnership {
    pub fn new(number: u64, files: &[&str]) -> Self {
        IssueFileOwnership {
            number,
            files: files.iter().map(|f| f.to_string()).collect(),
            blocked_by: Vec::new(),
        }
    }

    pub fn with_blocked_by(mut self, blocked_by: Vec<u64>) -> Self {
        self.blocked_by = blocked_by;
        self
    }
}
