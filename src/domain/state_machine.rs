//! State machine: transition checks and semantic-intent resolution
//!
//! The embedded table is canonical. A project may ship an override
//! (`.ralph/state-machine.json`) which is validated for completeness before use.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, ConfigPhase, RalphError, Result};
use crate::schemas::WorkflowState;

use super::commands::{
    canonical_command, canonical_intent, Command, CommandDefinition, SemanticIntent,
    WILDCARD_COMMAND,
};
use super::states::{canonical_state, StateDefinition};

/// Serializable form of the whole table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMachineDefinition {
    pub states: BTreeMap<WorkflowState, StateDefinition>,
    pub commands: BTreeMap<Command, CommandDefinition>,
    /// intent → (command name or `*`) → state; `null` marks an ambiguous mapping
    pub semantic_intents: BTreeMap<SemanticIntent, BTreeMap<String, Option<WorkflowState>>>,
}

impl StateMachineDefinition {
    /// The embedded canonical table
    pub fn canonical() -> Self {
        let states = WorkflowState::ALL
            .into_iter()
            .map(|s| (s, canonical_state(s)))
            .collect();
        let commands = Command::ALL
            .into_iter()
            .map(|c| (c, canonical_command(c)))
            .collect();
        let semantic_intents = SemanticIntent::ALL
            .into_iter()
            .map(|intent| {
                let targets = canonical_intent(intent)
                    .into_iter()
                    .map(|(cmd, target)| (cmd.to_string(), target))
                    .collect();
                (intent, targets)
            })
            .collect();
        StateMachineDefinition {
            states,
            commands,
            semantic_intents,
        }
    }
}

/// Outcome of looking up an intent for a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentResolution {
    Resolved(WorkflowState),
    /// The command can end in more than one state; the caller must pick
    Ambiguous,
    /// No mapping for this command
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntentTarget {
    State(WorkflowState),
    Ambiguous,
}

impl From<Option<WorkflowState>> for IntentTarget {
    fn from(target: Option<WorkflowState>) -> Self {
        match target {
            Some(state) => IntentTarget::State(state),
            None => IntentTarget::Ambiguous,
        }
    }
}

impl From<IntentTarget> for IntentResolution {
    fn from(target: IntentTarget) -> Self {
        match target {
            IntentTarget::State(state) => IntentResolution::Resolved(state),
            IntentTarget::Ambiguous => IntentResolution::Ambiguous,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct IntentTable {
    wildcard: Option<IntentTarget>,
    per_command: HashMap<Command, IntentTarget>,
}

/// A successful `resolve_state`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedState {
    pub resolved_state: WorkflowState,
    pub was_intent: bool,
    pub original_input: String,
    pub command: Command,
}

#[derive(Debug, Clone)]
pub struct StateMachine {
    definition: StateMachineDefinition,
    intents: HashMap<SemanticIntent, IntentTable>,
}

impl Default for StateMachine {
    fn default() -> Self {
        StateMachine::canonical()
    }
}

impl StateMachine {
    /// State machine backed by the embedded table
    pub fn canonical() -> Self {
        let definition = StateMachineDefinition::canonical();
        let intents = match build_intent_tables(&definition.semantic_intents) {
            Ok(intents) => intents,
            Err(errors) => {
                tracing::error!(count = errors.len(), "embedded intent table is inconsistent");
                HashMap::new()
            }
        };
        StateMachine {
            definition,
            intents,
        }
    }

    /// Build from an override table, rejecting incomplete or inconsistent ones.
    ///
    /// # Errors
    /// * `Config` (schema_validation) - listing every problem found
    pub fn from_definition(definition: StateMachineDefinition) -> Result<Self> {
        let mut errors = Vec::new();

        for s in WorkflowState::ALL {
            match definition.states.get(&s) {
                None => errors.push(ConfigError::new(
                    ConfigPhase::SchemaValidation,
                    format!("states.{}", s),
                    "state is missing from the table",
                )),
                Some(def) if def.is_terminal && !def.allowed_transitions.is_empty() => {
                    errors.push(ConfigError::new(
                        ConfigPhase::SchemaValidation,
                        format!("states.{}.allowed_transitions", s),
                        "terminal states cannot have outgoing transitions",
                    ))
                }
                Some(_) => {}
            }
        }

        for cmd in Command::ALL {
            if !definition.commands.contains_key(&cmd) {
                errors.push(ConfigError::new(
                    ConfigPhase::SchemaValidation,
                    format!("commands.{}", cmd),
                    "command is missing from the table",
                ));
            }
        }

        let intents = match build_intent_tables(&definition.semantic_intents) {
            Ok(intents) => intents,
            Err(mut intent_errors) => {
                errors.append(&mut intent_errors);
                HashMap::new()
            }
        };

        if !errors.is_empty() {
            return Err(RalphError::Config(errors));
        }

        Ok(StateMachine {
            definition,
            intents,
        })
    }

    pub fn definition(&self) -> &StateMachineDefinition {
        &self.definition
    }

    pub fn state_info(&self, state: WorkflowState) -> Option<&StateDefinition> {
        self.definition.states.get(&state)
    }

    pub fn command_info(&self, command: Command) -> Option<&CommandDefinition> {
        self.definition.commands.get(&command)
    }

    pub fn allowed_transitions(&self, from: WorkflowState) -> &[WorkflowState] {
        self.state_info(from)
            .map(|def| def.allowed_transitions.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_valid_transition(&self, from: WorkflowState, to: WorkflowState) -> bool {
        self.allowed_transitions(from).contains(&to)
    }

    /// String form for provider data; an unknown `from` or `to` is never valid.
    pub fn is_valid_transition_str(&self, from: &str, to: &str) -> bool {
        match (from.parse::<WorkflowState>(), to.parse::<WorkflowState>()) {
            (Ok(from), Ok(to)) => self.is_valid_transition(from, to),
            _ => false,
        }
    }

    pub fn is_lock_state(&self, state: WorkflowState) -> bool {
        self.state_info(state).map(|d| d.is_lock_state).unwrap_or(false)
    }

    pub fn is_terminal(&self, state: WorkflowState) -> bool {
        self.state_info(state).map(|d| d.is_terminal).unwrap_or(false)
    }

    pub fn requires_human_action(&self, state: WorkflowState) -> bool {
        self.state_info(state)
            .map(|d| d.requires_human_action)
            .unwrap_or(false)
    }

    /// Wildcard entries win over per-command entries.
    pub fn resolve_intent(&self, intent: SemanticIntent, command: Command) -> IntentResolution {
        let Some(table) = self.intents.get(&intent) else {
            return IntentResolution::Unsupported;
        };
        if let Some(target) = table.wildcard {
            return target.into();
        }
        match table.per_command.get(&command) {
            Some(target) => (*target).into(),
            None => IntentResolution::Unsupported,
        }
    }

    /// Output states plus lock state of a command
    pub fn valid_direct_states(&self, command: Command) -> Vec<WorkflowState> {
        self.command_info(command)
            .map(|def| def.direct_states())
            .unwrap_or_default()
    }

    /// Unknown command names pass, so newer callers are not blocked by an older table.
    pub fn is_valid_output_for_command(&self, command: &str, state: WorkflowState) -> bool {
        match Command::normalize(command).and_then(|c| self.command_info(c)) {
            Some(def) => def.allows_output(state),
            None => true,
        }
    }

    /// Commands for which the intent resolves to a concrete state
    pub fn commands_supporting(&self, intent: SemanticIntent) -> Vec<Command> {
        Command::ALL
            .into_iter()
            .filter(|c| matches!(self.resolve_intent(intent, *c), IntentResolution::Resolved(_)))
            .collect()
    }

    /// Intents that land on a state the command may output
    fn intent_hints(&self, command: Command) -> Vec<(String, String)> {
        SemanticIntent::ALL
            .into_iter()
            .filter_map(|intent| match self.resolve_intent(intent, command) {
                IntentResolution::Resolved(state)
                    if self.is_valid_output_for_command(command.as_str(), state) =>
                {
                    Some((intent.token().to_string(), state.to_string()))
                }
                _ => None,
            })
            .collect()
    }

    /// Turn an agent's requested state (direct name or semantic intent) into
    /// the concrete state to write for this command.
    ///
    /// # Errors
    /// * `UnknownCommand` - command is not a known workflow step
    /// * `UnknownIntent` - `__X__` token that is not a known intent
    /// * `IntentNotSupported` - intent has no mapping for the command
    /// * `IntentAmbiguous` - intent maps to several states for the command
    /// * `InvalidDirectState` - state is not an output of the command
    pub fn resolve_state(&self, input: &str, command: &str) -> Result<ResolvedState> {
        let Some(cmd) = Command::normalize(command) else {
            tracing::debug!(command, "unknown command");
            return Err(RalphError::UnknownCommand {
                command: command.to_string(),
                valid: Command::names(),
            });
        };

        let valid_states = || -> Vec<String> {
            self.valid_direct_states(cmd)
                .iter()
                .map(|s| s.to_string())
                .collect()
        };

        let intent = SemanticIntent::parse(input);
        if intent.is_some() || SemanticIntent::looks_like_token(input) {
            let Some(intent) = intent else {
                tracing::debug!(input, "unknown semantic intent");
                return Err(RalphError::UnknownIntent {
                    intent: input.to_string(),
                    valid: SemanticIntent::tokens(),
                });
            };

            return match self.resolve_intent(intent, cmd) {
                IntentResolution::Resolved(state) => {
                    tracing::debug!(%intent, command = %cmd, %state, "intent resolved");
                    Ok(ResolvedState {
                        resolved_state: state,
                        was_intent: true,
                        original_input: input.to_string(),
                        command: cmd,
                    })
                }
                IntentResolution::Unsupported => Err(RalphError::IntentNotSupported {
                    intent: intent.token().to_string(),
                    command: cmd.to_string(),
                    supported_by: self
                        .commands_supporting(intent)
                        .iter()
                        .map(|c| c.to_string())
                        .collect(),
                    valid_states: valid_states(),
                }),
                IntentResolution::Ambiguous => Err(RalphError::IntentAmbiguous {
                    intent: intent.token().to_string(),
                    command: cmd.to_string(),
                    valid_states: valid_states(),
                }),
            };
        }

        match WorkflowState::parse_lenient(input) {
            Some(state) if self.is_valid_output_for_command(cmd.as_str(), state) => {
                Ok(ResolvedState {
                    resolved_state: state,
                    was_intent: false,
                    original_input: input.to_string(),
                    command: cmd,
                })
            }
            _ => {
                tracing::debug!(input, command = %cmd, "invalid direct state");
                Err(RalphError::InvalidDirectState {
                    state: input.to_string(),
                    command: cmd.to_string(),
                    valid_states: valid_states(),
                    intent_hints: self.intent_hints(cmd),
                })
            }
        }
    }
}

fn build_intent_tables(
    raw: &BTreeMap<SemanticIntent, BTreeMap<String, Option<WorkflowState>>>,
) -> std::result::Result<HashMap<SemanticIntent, IntentTable>, Vec<ConfigError>> {
    let mut tables = HashMap::new();
    let mut errors = Vec::new();

    for (intent, targets) in raw {
        let mut table = IntentTable::default();
        for (key, target) in targets {
            if key == WILDCARD_COMMAND {
                table.wildcard = Some((*target).into());
                continue;
            }
            match key.parse::<Command>() {
                Ok(cmd) => {
                    table.per_command.insert(cmd, (*target).into());
                }
                Err(_) => errors.push(ConfigError::new(
                    ConfigPhase::SchemaValidation,
                    format!("semantic_intents.{}.{}", intent, key),
                    format!("unknown command; valid: *, {}", Command::names().join(", ")),
                )),
            }
        }
        tables.insert(*intent, table);
    }

    if errors.is_empty() {
        Ok(tables)
    } else {
        Err(errors)
    }
}
