//! Workflow state and estimate schemas

use serde::{Deserialize, Serialize};

/// Workflow state for an issue on the project board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkflowState {
    /// Captured, not yet triaged
    #[serde(rename = "Backlog")]
    Backlog,
    /// Triaged; needs investigation before planning
    #[serde(rename = "Research Needed")]
    ResearchNeeded,
    /// An analyst holds the research lock
    #[serde(rename = "Research in Progress")]
    ResearchInProgress,
    /// Research done; waiting for a planner
    #[serde(rename = "Ready for Plan")]
    ReadyForPlan,
    /// A planner holds the plan lock
    #[serde(rename = "Plan in Progress")]
    PlanInProgress,
    /// Plan written; waiting for approval
    #[serde(rename = "Plan in Review")]
    PlanInReview,
    /// A builder holds the implementation lock
    #[serde(rename = "In Progress")]
    InProgress,
    /// Pull request open
    #[serde(rename = "In Review")]
    InReview,
    /// Work complete
    #[serde(rename = "Done")]
    Done,
    /// Abandoned
    #[serde(rename = "Canceled")]
    Canceled,
    /// Blocked on a person
    #[serde(rename = "Human Needed")]
    HumanNeeded,
}

impl WorkflowState {
    /// All states, in pipeline order followed by the off-pipeline states
    pub const ALL: [WorkflowState; 11] = [
        WorkflowState::Backlog,
        WorkflowState::ResearchNeeded,
        WorkflowState::ResearchInProgress,
        WorkflowState::ReadyForPlan,
        WorkflowState::PlanInProgress,
        WorkflowState::PlanInReview,
        WorkflowState::InProgress,
        WorkflowState::InReview,
        WorkflowState::Done,
        WorkflowState::Canceled,
        WorkflowState::HumanNeeded,
    ];

    /// Board column name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Backlog => "Backlog",
            WorkflowState::ResearchNeeded => "Research Needed",
            WorkflowState::ResearchInProgress => "Research in Progress",
            WorkflowState::ReadyForPlan => "Ready for Plan",
            WorkflowState::PlanInProgress => "Plan in Progress",
            WorkflowState::PlanInReview => "Plan in Review",
            WorkflowState::InProgress => "In Progress",
            WorkflowState::InReview => "In Review",
            WorkflowState::Done => "Done",
            WorkflowState::Canceled => "Canceled",
            WorkflowState::HumanNeeded => "Human Needed",
        }
    }

    /// Parse a board column name, ignoring case and surrounding whitespace.
    ///
    /// Returns None for unknown or empty names.
    pub fn parse_lenient(name: &str) -> Option<WorkflowState> {
        let name = name.trim();
        WorkflowState::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WorkflowState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkflowState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("Unknown workflow state: {}", s))
    }
}

/// T-shirt size estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Estimate {
    Xs,
    S,
    M,
    L,
    Xl,
}

impl Estimate {
    /// Whether the issue is too large to hand to a single builder
    pub fn is_oversized(&self) -> bool {
        matches!(self, Estimate::M | Estimate::L | Estimate::Xl)
    }
}

impl std::fmt::Display for Estimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Estimate::Xs => write!(f, "XS"),
            Estimate::S => write!(f, "S"),
            Estimate::M => write!(f, "M"),
            Estimate::L => write!(f, "L"),
            Estimate::Xl => write!(f, "XL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_state_serialization() {
        assert_eq!(serde_json::to_string(&WorkflowState::Backlog).unwrap(), "\"Backlog\"");
        assert_eq!(
            serde_json::to_string(&WorkflowState::ResearchInProgress).unwrap(),
            "\"Research in Progress\""
        );
        assert_eq!(
            serde_json::to_string(&WorkflowState::HumanNeeded).unwrap(),
            "\"Human Needed\""
        );
    }

    #[test]
    fn test_workflow_state_deserialization() {
        assert_eq!(
            serde_json::from_str::<WorkflowState>("\"Plan in Review\"").unwrap(),
            WorkflowState::PlanInReview
        );
        assert!(serde_json::from_str::<WorkflowState>("\"plan_in_review\"").is_err());
    }

    #[test]
    fn test_display_matches_serde_name() {
        for state in WorkflowState::ALL {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state));
        }
    }

    #[test]
    fn test_from_str_is_exact() {
        assert_eq!("Ready for Plan".parse::<WorkflowState>(), Ok(WorkflowState::ReadyForPlan));
        assert!("ready for plan".parse::<WorkflowState>().is_err());
        assert!("".parse::<WorkflowState>().is_err());
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(WorkflowState::parse_lenient(" in progress "), Some(WorkflowState::InProgress));
        assert_eq!(WorkflowState::parse_lenient("Unknown"), None);
        assert_eq!(WorkflowState::parse_lenient(""), None);
    }

    #[test]
    fn test_estimate_serialization() {
        assert_eq!(serde_json::to_string(&Estimate::Xs).unwrap(), "\"XS\"");
        assert_eq!(serde_json::to_string(&Estimate::Xl).unwrap(), "\"XL\"");
        assert_eq!(serde_json::from_str::<Estimate>("\"M\"").unwrap(), Estimate::M);
    }

    #[test]
    fn test_estimate_oversized() {
        assert!(!Estimate::Xs.is_oversized());
        assert!(!Estimate::S.is_oversized());
        assert!(Estimate::M.is_oversized());
        assert!(Estimate::L.is_oversized());
        assert!(Estimate::Xl.is_oversized());
    }
}
