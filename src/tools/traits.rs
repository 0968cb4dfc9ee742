use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Description of a tool for the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Core tool trait — implement for any capability.
///
/// A tool maps a structured input to an observation string or fails. Tools
/// must be safe for concurrent invocation: a single decision may dispatch
/// several of them in parallel.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (used by the decision-maker to address it).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// JSON schema for parameters.
    fn parameters_schema(&self) -> Value {
        serde_json::json!({"type": "object"})
    }

    /// Execute the tool with the given input, producing an observation.
    async fn execute(&self, input: Value) -> Result<String, ToolError>;

    /// Get the full spec for advertising to the model.
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Pull a required string field out of a tool input object.
pub(crate) fn required_str_field<'a>(
    tool: &str,
    input: &'a Value,
    field: &str,
) -> Result<&'a str, ToolError> {
    input
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::invalid_input(tool, format!("missing '{field}' parameter")))
}
