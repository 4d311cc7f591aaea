//! Routing config schema - declarative rules that send new issues to projects

use serde::{Deserialize, Serialize};

/// The only supported routing config version
pub const ROUTING_CONFIG_VERSION: u32 = 1;

/// Label criteria; both lists are compared case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelMatch {
    /// At least one of these labels must be present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any: Option<Vec<String>>,

    /// Every one of these labels must be present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all: Option<Vec<String>>,
}

impl LabelMatch {
    pub fn is_empty(&self) -> bool {
        self.any.is_none() && self.all.is_none()
    }
}

/// Conditions a rule checks against an issue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MatchCriteria {
    /// Repository glob such as `my-org/*` or `my-org/**`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<LabelMatch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,

    /// Invert the combined result
    #[serde(default)]
    pub negate: bool,
}

/// What to do with a matching issue; carried out by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoutingAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_number: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_numbers: Option<Vec<u64>>,

    /// Board column to place the issue in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_state: Option<String>,

    /// Labels to add
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl RoutingAction {
    pub fn is_empty(&self) -> bool {
        self.project_number.is_none()
            && self.project_numbers.is_none()
            && self.workflow_state.is_none()
            && self.labels.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "match")]
    pub criteria: MatchCriteria,

    pub action: RoutingAction,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl RoutingRule {
    pub fn new(criteria: MatchCriteria, action: RoutingAction) -> Self {
        RoutingRule {
            name: None,
            criteria,
            action,
            enabled: true,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Name for logs and reports; falls back to the rule's position
    pub fn display_name(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("rules[{}]", index),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_stop_on_first_match() -> bool {
    true
}

/// Top-level routing config, usually `.ralph/routing.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoutingConfig {
    pub version: u32,

    #[serde(default = "default_stop_on_first_match")]
    pub stop_on_first_match: bool,

    #[serde(default)]
    pub rules: Vec<RoutingRule>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        RoutingConfig {
            version: ROUTING_CONFIG_VERSION,
            stop_on_first_match: true,
            rules: Vec::new(),
        }
    }
}

/// The issue being routed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueContext {
    /// `owner/name`
    pub repo: String,

    #[serde(default)]
    pub labels: Vec<String>,

    #[serde(default)]
    pub issue_type: Option<String>,
}

impl IssueContext {
    pub fn new(repo: impl Into<String>) -> Self {
        IssueContext {
            repo: repo.into(),
            labels: Vec::new(),
            issue_type: None,
        }
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_issue_type(mut self, issue_type: impl Into<String>) -> Self {
        self.issue_type = Some(issue_type.into());
        self
    }
}
