use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Core decision types ──────────────────────────────────────────────────────

/// Key under which a finish carries its primary answer text.
pub const OUTPUT_KEY: &str = "output";

/// A request to invoke a named tool with a given input.
///
/// Immutable once created; the `log` field carries the human-readable trace
/// of how the decision-maker arrived at this action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAction {
    pub tool: String,
    pub tool_input: Value,
    pub log: String,
}

/// Terminal decision carrying the run's output values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentFinish {
    pub return_values: Map<String, Value>,
    pub log: String,
}

impl AgentFinish {
    /// Finish whose only return value is `output` = the given text.
    pub fn from_output(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut return_values = Map::new();
        return_values.insert(OUTPUT_KEY.to_string(), Value::String(text.clone()));
        Self {
            return_values,
            log: text,
        }
    }

    /// The `output` value, if present and textual.
    pub fn output(&self) -> Option<&str> {
        self.return_values.get(OUTPUT_KEY).and_then(Value::as_str)
    }
}

/// What the decision-maker wants to happen next.
///
/// Single- and multi-action decision-makers are modelled uniformly: a
/// decision is always a sequence of actions (possibly length 1) or a finish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AgentDecision {
    Act(Vec<AgentAction>),
    Finish(AgentFinish),
}

impl AgentDecision {
    pub fn single(action: AgentAction) -> Self {
        Self::Act(vec![action])
    }

    pub fn is_finish(&self) -> bool {
        matches!(self, Self::Finish(_))
    }
}

/// A recorded (action, observation) pair.
///
/// Steps are append-only; insertion order is replayed verbatim to the
/// decision-maker as history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStep {
    pub action: AgentAction,
    pub observation: String,
}

// ── Tests ────────────────────────────────────────────────────────────────────
