//! Workflow commands and semantic intents
//!
//! A command is the workflow step an agent is running. A semantic intent is
//! a command-independent token (`__COMPLETE__`, `__LOCK__`, ...) that the
//! state machine turns into a concrete state for that command.

use serde::{Deserialize, Serialize};

use crate::schemas::WorkflowState;

/// Prefix every canonical command name carries
pub const COMMAND_PREFIX: &str = "ralph_";

/// The invoking workflow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Command {
    #[serde(rename = "ralph_triage")]
    Triage,
    #[serde(rename = "ralph_split")]
    Split,
    #[serde(rename = "ralph_research")]
    Research,
    #[serde(rename = "ralph_plan")]
    Plan,
    #[serde(rename = "ralph_review")]
    Review,
    #[serde(rename = "ralph_impl")]
    Impl,
    #[serde(rename = "ralph_hero")]
    Hero,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::Triage,
        Command::Split,
        Command::Research,
        Command::Plan,
        Command::Review,
        Command::Impl,
        Command::Hero,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Triage => "ralph_triage",
            Command::Split => "ralph_split",
            Command::Research => "ralph_research",
            Command::Plan => "ralph_plan",
            Command::Review => "ralph_review",
            Command::Impl => "ralph_impl",
            Command::Hero => "ralph_hero",
        }
    }

    /// Accepts both `plan` and `ralph_plan`, in any case.
    pub fn normalize(name: &str) -> Option<Command> {
        let lowered = name.trim().to_ascii_lowercase();
        let canonical = if lowered.starts_with(COMMAND_PREFIX) {
            lowered
        } else {
            format!("{}{}", COMMAND_PREFIX, lowered)
        };
        canonical.parse().ok()
    }

    pub fn names() -> Vec<String> {
        Command::ALL.iter().map(|c| c.as_str().to_string()).collect()
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown command: {}", s))
    }
}

/// Symbolic target state, resolved per command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SemanticIntent {
    #[serde(rename = "__LOCK__")]
    Lock,
    #[serde(rename = "__COMPLETE__")]
    Complete,
    #[serde(rename = "__ESCALATE__")]
    Escalate,
    #[serde(rename = "__CLOSE__")]
    Close,
    #[serde(rename = "__CANCEL__")]
    Cancel,
}

impl SemanticIntent {
    pub const ALL: [SemanticIntent; 5] = [
        SemanticIntent::Lock,
        SemanticIntent::Complete,
        SemanticIntent::Escalate,
        SemanticIntent::Close,
        SemanticIntent::Cancel,
    ];

    /// Token form, e.g. `__LOCK__`
    pub fn token(&self) -> &'static str {
        match self {
            SemanticIntent::Lock => "__LOCK__",
            SemanticIntent::Complete => "__COMPLETE__",
            SemanticIntent::Escalate => "__ESCALATE__",
            SemanticIntent::Close => "__CLOSE__",
            SemanticIntent::Cancel => "__CANCEL__",
        }
    }

    /// Token without the surrounding `__`
    pub fn name(&self) -> &'static str {
        self.token().trim_matches('_')
    }

    /// Whether the input is written in token form (`__X__`)
    pub fn looks_like_token(input: &str) -> bool {
        let input = input.trim();
        input.len() > 4 && input.starts_with("__") && input.ends_with("__")
    }

    /// Parse `__LOCK__`, `LOCK` or `lock`.
    pub fn parse(input: &str) -> Option<SemanticIntent> {
        let input = input.trim();
        let bare = input
            .strip_prefix("__")
            .and_then(|rest| rest.strip_suffix("__"))
            .unwrap_or(input);
        SemanticIntent::ALL
            .into_iter()
            .find(|intent| intent.name().eq_ignore_ascii_case(bare))
    }

    pub fn tokens() -> Vec<String> {
        SemanticIntent::ALL
            .iter()
            .map(|i| i.token().to_string())
            .collect()
    }
}

impl std::fmt::Display for SemanticIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Input and output contract of one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub valid_input_states: Vec<WorkflowState>,
    pub valid_output_states: Vec<WorkflowState>,
    /// State held while the command runs
    #[serde(default)]
    pub lock_state: Option<WorkflowState>,
}

impl CommandDefinition {
    /// Output states plus the lock state, without duplicates
    pub fn direct_states(&self) -> Vec<WorkflowState> {
        let mut states = self.valid_output_states.clone();
        if let Some(lock) = self.lock_state {
            if !states.contains(&lock) {
                states.push(lock);
            }
        }
        states
    }

    pub fn allows_output(&self, state: WorkflowState) -> bool {
        self.valid_output_states.contains(&state) || self.lock_state == Some(state)
    }
}

fn command(
    valid_input_states: &[WorkflowState],
    valid_output_states: &[WorkflowState],
    lock_state: Option<WorkflowState>,
) -> CommandDefinition {
    CommandDefinition {
        valid_input_states: valid_input_states.to_vec(),
        valid_output_states: valid_output_states.to_vec(),
        lock_state,
    }
}

/// Canonical contract for each command
pub fn canonical_command(cmd: Command) -> CommandDefinition {
    use WorkflowState::*;

    match cmd {
        Command::Triage => command(
            &[Backlog],
            &[ResearchNeeded, ReadyForPlan, Done, Canceled, HumanNeeded],
            None,
        ),
        Command::Split => command(&[Backlog, ResearchNeeded], &[Backlog], None),
        Command::Research => command(
            &[ResearchNeeded],
            &[ReadyForPlan, HumanNeeded],
            Some(ResearchInProgress),
        ),
        Command::Plan => command(
            &[ReadyForPlan],
            &[PlanInReview, HumanNeeded],
            Some(PlanInProgress),
        ),
        Command::Review => command(
            &[PlanInReview],
            &[InProgress, ReadyForPlan, HumanNeeded],
            None,
        ),
        Command::Impl => command(&[InProgress], &[InReview, HumanNeeded], Some(InProgress)),
        Command::Hero => command(
            &[Backlog, ResearchNeeded, ReadyForPlan, PlanInReview, InProgress, InReview],
            &[InReview, Done, HumanNeeded, Canceled],
            None,
        ),
    }
}

/// Key used in intent tables for "every command"
pub const WILDCARD_COMMAND: &str = "*";

/// Canonical intent table as (command key, target) pairs. A `None` target
/// marks the intent as ambiguous for that command.
pub fn canonical_intent(intent: SemanticIntent) -> Vec<(&'static str, Option<WorkflowState>)> {
    use WorkflowState::*;

    match intent {
        SemanticIntent::Lock => vec![
            ("ralph_research", Some(ResearchInProgress)),
            ("ralph_plan", Some(PlanInProgress)),
            ("ralph_impl", Some(InProgress)),
        ],
        SemanticIntent::Complete => vec![
            ("ralph_triage", None),
            ("ralph_split", Some(Backlog)),
            ("ralph_research", Some(ReadyForPlan)),
            ("ralph_plan", Some(PlanInReview)),
            ("ralph_review", Some(InProgress)),
            ("ralph_impl", Some(InReview)),
        ],
        SemanticIntent::Escalate => vec![(WILDCARD_COMMAND, Some(HumanNeeded))],
        SemanticIntent::Close => vec![(WILDCARD_COMMAND, Some(Done))],
        SemanticIntent::Cancel => vec![(WILDCARD_COMMAND, Some(Canceled))],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_normalize() {
        assert_eq!(Command::normalize("plan"), Some(Command::Plan));
        assert_eq!(Command::normalize("ralph_plan"), Some(Command::Plan));
        assert_eq!(Command::normalize(" RALPH_IMPL "), Some(Command::Impl));
        assert_eq!(Command::normalize("Triage"), Some(Command::Triage));
        assert_eq!(Command::normalize("deploy"), None);
        assert_eq!(Command::normalize(""), None);
    }

    #[test]
    fn test_command_serialization() {
        assert_eq!(serde_json::to_string(&Command::Impl).unwrap(), "\"ralph_impl\"");
        assert_eq!(
            serde_json::from_str::<Command>("\"ralph_hero\"").unwrap(),
            Command::Hero
        );
    }

    #[test]
    fn test_intent_parse() {
        assert_eq!(SemanticIntent::parse("__LOCK__"), Some(SemanticIntent::Lock));
        assert_eq!(SemanticIntent::parse("lock"), Some(SemanticIntent::Lock));
        assert_eq!(SemanticIntent::parse("Complete"), Some(SemanticIntent::Complete));
        assert_eq!(SemanticIntent::parse("__FINISH__"), None);
        assert_eq!(SemanticIntent::parse("Done"), None);
    }

    #[test]
    fn test_intent_parse_rejects_unbalanced_underscores() {
        for input in ["_lock", "lock___", "___COMPLETE_", "__LOCK", "LOCK__", "___LOCK___", "__"] {
            assert_eq!(SemanticIntent::parse(input), None, "{}", input);
        }
        assert_eq!(SemanticIntent::parse("  __cancel__ "), Some(SemanticIntent::Cancel));
    }

    #[test]
    fn test_looks_like_token() {
        assert!(SemanticIntent::looks_like_token("__FINISH__"));
        assert!(!SemanticIntent::looks_like_token("____"));
        assert!(!SemanticIntent::looks_like_token("lock"));
    }

    #[test]
    fn test_direct_states_include_lock() {
        let plan = canonical_command(Command::Plan);
        assert_eq!(
            plan.direct_states(),
            vec![
                WorkflowState::PlanInReview,
                WorkflowState::HumanNeeded,
                WorkflowState::PlanInProgress
            ]
        );
        assert!(plan.allows_output(WorkflowState::PlanInProgress));
        assert!(!plan.allows_output(WorkflowState::Done));
    }

    #[test]
    fn test_impl_lock_not_duplicated() {
        let imp = CommandDefinition {
            valid_input_states: vec![],
            valid_output_states: vec![WorkflowState::InProgress],
            lock_state: Some(WorkflowState::InProgress),
        };
        assert_eq!(imp.direct_states(), vec![WorkflowState::InProgress]);
    }
}
