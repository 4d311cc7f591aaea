//! Error types for ralph-engine
//!
//! Each error type has a corresponding error code for programmatic handling.
//! Resolution errors render recovery text that lists the valid alternatives,
//! since the usual caller is an agent that retries from the message alone.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for ralph-engine operations
pub type Result<T> = std::result::Result<T, RalphError>;

/// Stage of configuration loading that rejected the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigPhase {
    /// The document is not well-formed YAML
    YamlParse,
    /// The document does not match the config schema
    SchemaValidation,
    /// A rule references something the live field schema does not have
    LiveValidation,
}

impl std::fmt::Display for ConfigPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigPhase::YamlParse => write!(f, "yaml_parse"),
            ConfigPhase::SchemaValidation => write!(f, "schema_validation"),
            ConfigPhase::LiveValidation => write!(f, "live_validation"),
        }
    }
}

/// A single configuration problem, located by path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigError {
    pub phase: ConfigPhase,
    /// Dotted path into the document, e.g. `rules[2].match`
    pub path: String,
    pub message: String,
}

impl ConfigError {
    pub fn new(phase: ConfigPhase, path: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError {
            phase,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "[{}] {}", self.phase, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.phase, self.path, self.message)
        }
    }
}

fn join_config_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_hints(hints: &[(String, String)]) -> String {
    if hints.is_empty() {
        return String::new();
    }
    let joined = hints
        .iter()
        .map(|(intent, state)| format!("{} (resolves to \"{}\")", intent, state))
        .collect::<Vec<_>>()
        .join(", ");
    format!(". Semantic intents available: {}", joined)
}

fn format_allowed(allowed: &[String]) -> String {
    if allowed.is_empty() {
        "(none)".to_string()
    } else {
        allowed.join(", ")
    }
}

/// Main error type for all ralph-engine operations
#[derive(Debug, Error)]
pub enum RalphError {
    /// Command name is not one of the known workflow commands
    #[error("Unknown command \"{command}\". Valid commands: {}", .valid.join(", "))]
    UnknownCommand { command: String, valid: Vec<String> },

    /// Input looked like a semantic intent but is not a known one
    #[error("Unknown semantic intent \"{intent}\". Valid intents: {}", .valid.join(", "))]
    UnknownIntent { intent: String, valid: Vec<String> },

    /// Intent exists but has no mapping for this command
    #[error(
        "Intent {intent} is not supported by {command}. Commands that support it: {}. \
         Valid states for {command}: {}",
        .supported_by.join(", "),
        .valid_states.join(", ")
    )]
    IntentNotSupported {
        intent: String,
        command: String,
        supported_by: Vec<String>,
        valid_states: Vec<String>,
    },

    /// Intent maps to more than one possible state for this command
    #[error(
        "Intent {intent} is ambiguous for {command}; pass a direct state instead. \
         Valid states for {command}: {}",
        .valid_states.join(", ")
    )]
    IntentAmbiguous {
        intent: String,
        command: String,
        valid_states: Vec<String>,
    },

    /// Direct state name is not a valid output of this command
    #[error(
        "State \"{state}\" is not a valid output for {command}. Valid states: {}{}",
        .valid_states.join(", "),
        format_hints(.intent_hints)
    )]
    InvalidDirectState {
        state: String,
        command: String,
        valid_states: Vec<String>,
        /// (intent token, state it resolves to)
        intent_hints: Vec<(String, String)>,
    },

    /// Requested transition is not in the table
    #[error(
        "Transition from \"{from}\" to \"{to}\" is not allowed. Allowed from \"{from}\": {}",
        format_allowed(.allowed)
    )]
    InvalidTransition {
        from: String,
        to: String,
        allowed: Vec<String>,
    },

    /// Configuration failed to load or validate
    #[error("Configuration error: {}", join_config_errors(.0))]
    Config(Vec<ConfigError>),

    /// Invalid JSON format
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error with context
    #[error("{context}: {message}")]
    Wrapped { context: String, message: String },
}

impl RalphError {
    /// Get the error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            RalphError::UnknownCommand { .. } => "UNKNOWN_COMMAND",
            RalphError::UnknownIntent { .. } => "UNKNOWN_INTENT",
            RalphError::IntentNotSupported { .. } => "INTENT_NOT_SUPPORTED",
            RalphError::IntentAmbiguous { .. } => "INTENT_AMBIGUOUS",
            RalphError::InvalidDirectState { .. } => "INVALID_DIRECT_STATE",
            RalphError::InvalidTransition { .. } => "INVALID_TRANSITION",
            RalphError::Config(_) => "CONFIG_ERROR",
            RalphError::InvalidJson(_) => "INVALID_JSON",
            RalphError::FileNotFound(_) => "FILE_NOT_FOUND",
            RalphError::Io(_) => "IO_ERROR",
            RalphError::Wrapped { .. } => "WRAPPED_ERROR",
        }
    }

    /// Whether a caller can fix the input and retry
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            RalphError::UnknownCommand { .. }
                | RalphError::UnknownIntent { .. }
                | RalphError::IntentNotSupported { .. }
                | RalphError::IntentAmbiguous { .. }
                | RalphError::InvalidDirectState { .. }
        )
    }

    /// Build a config error from a single problem
    pub fn config(phase: ConfigPhase, path: impl Into<String>, message: impl Into<String>) -> Self {
        RalphError::Config(vec![ConfigError::new(phase, path, message)])
    }

    /// Wrap an error with additional context
    pub fn wrap<E: std::fmt::Display>(error: E, context: impl Into<String>) -> Self {
        RalphError::Wrapped {
            context: context.into(),
            message: error.to_string(),
        }
    }
}

/// Convert an error to an appropriate exit code
pub fn to_exit_code(error: &RalphError) -> i32 {
    match error {
        e if e.is_resolution_error() => 2,
        RalphError::Config(_) => 3,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let unknown = RalphError::UnknownCommand {
            command: "x".into(),
            valid: vec![],
        };
        assert_eq!(unknown.code(), "UNKNOWN_COMMAND");
        assert_eq!(RalphError::InvalidJson("test".into()).code(), "INVALID_JSON");
        assert_eq!(RalphError::FileNotFound("test".into()).code(), "FILE_NOT_FOUND");
        assert_eq!(
            RalphError::config(ConfigPhase::YamlParse, "", "bad").code(),
            "CONFIG_ERROR"
        );
    }

    #[test]
    fn test_exit_codes() {
        let ambiguous = RalphError::IntentAmbiguous {
            intent: "__COMPLETE__".into(),
            command: "ralph_triage".into(),
            valid_states: vec![],
        };
        assert_eq!(to_exit_code(&ambiguous), 2);
        assert_eq!(to_exit_code(&RalphError::config(ConfigPhase::SchemaValidation, "", "x")), 3);
        assert_eq!(to_exit_code(&RalphError::FileNotFound("test".into())), 1);
    }

    #[test]
    fn test_invalid_direct_state_lists_hints() {
        let err = RalphError::InvalidDirectState {
            state: "Done".into(),
            command: "ralph_plan".into(),
            valid_states: vec!["Plan in Review".into(), "Human Needed".into()],
            intent_hints: vec![("__COMPLETE__".into(), "Plan in Review".into())],
        };
        let text = err.to_string();
        assert!(text.contains("Valid states: Plan in Review, Human Needed"));
        assert!(text.contains("__COMPLETE__ (resolves to \"Plan in Review\")"));
    }

    #[test]
    fn test_config_error_display() {
        let err = RalphError::Config(vec![
            ConfigError::new(ConfigPhase::SchemaValidation, "version", "must be 1"),
            ConfigError::new(ConfigPhase::SchemaValidation, "rules[0].action", "empty"),
        ]);
        assert_eq!(
            err.to_string(),
            "Configuration error: [schema_validation] version: must be 1; \
             [schema_validation] rules[0].action: empty"
        );
    }

    #[test]
    fn test_invalid_transition_from_terminal() {
        let err = RalphError::InvalidTransition {
            from: "Done".into(),
            to: "Backlog".into(),
            allowed: vec![],
        };
        assert_eq!(err.code(), "INVALID_TRANSITION");
        assert!(err.to_string().ends_with("Allowed from \"Done\": (none)"));
        assert_eq!(to_exit_code(&err), 1);
    }

    #[test]
    fn test_wrap_error() {
        let wrapped = RalphError::wrap("inner error", "outer context");
        assert_eq!(wrapped.code(), "WRAPPED_ERROR");
        assert!(wrapped.to_string().contains("outer context"));
        assert!(wrapped.to_string().contains("inner error"));
    }
}
