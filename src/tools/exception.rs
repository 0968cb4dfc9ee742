use super::traits::Tool;
use crate::error::ToolError;
use async_trait::async_trait;
use serde_json::Value;

/// Name under which parse-failure steps are recorded.
pub const EXCEPTION_TOOL_NAME: &str = "_exception";

/// Tool that just returns the query.
///
/// Used by the executor to echo an unrecoverable parsing error back into the
/// loop as an observation; it performs no side effect beyond returning the
/// text it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExceptionTool;

impl ExceptionTool {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for ExceptionTool {
    fn name(&self) -> &str {
        EXCEPTION_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Exception tool"
    }

    async fn execute(&self, input: Value) -> Result<String, ToolError> {
        Ok(match input {
            Value::String(text) => text,
            other => other.to_string(),
        })
    }
}
