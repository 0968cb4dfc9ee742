use super::OutputParser;
use crate::error::OutputParseError;
use crate::llm::ProviderResponse;
use crate::schema::{AgentAction, AgentDecision, AgentFinish};
use serde_json::Value;

/// Parser for responses carrying machine-readable call descriptors.
///
/// Each descriptor's argument payload is decoded here rather than at the
/// provider layer, so a malformed payload surfaces as a parse error that
/// preserves the payload verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolCallParser;

impl ToolCallParser {
    pub fn new() -> Self {
        Self
    }

    /// Convert a provider response into a decision.
    ///
    /// No descriptors present means the whole message content is the finish
    /// log and return value.
    pub fn parse_response(
        &self,
        response: &ProviderResponse,
    ) -> Result<AgentDecision, OutputParseError> {
        if !response.has_tool_calls() {
            return Ok(AgentDecision::Finish(AgentFinish::from_output(
                response.text.clone(),
            )));
        }

        let mut actions = Vec::with_capacity(response.tool_calls.len());
        for call in &response.tool_calls {
            let raw = call.arguments.trim();
            let tool_input: Value = if raw.is_empty() {
                Value::Object(serde_json::Map::new())
            } else {
                serde_json::from_str(raw).map_err(|e| {
                    OutputParseError::new(
                        format!("failed to decode arguments for \"{}\": {e}", call.name),
                        call.arguments.clone(),
                    )
                })?
            };

            let shown_args = if raw.is_empty() { "{}" } else { raw };
            actions.push(AgentAction {
                tool: call.name.clone(),
                tool_input,
                log: format!(
                    "Invoking \"{}\" with {}\n{}",
                    call.name, shown_args, response.text
                ),
            });
        }

        Ok(AgentDecision::Act(actions))
    }
}

impl OutputParser for ToolCallParser {
    /// Free text carries no call descriptors; this parser needs the full
    /// response message.
    fn parse(&self, text: &str) -> Result<AgentDecision, OutputParseError> {
        Err(OutputParseError::new(
            "tool-call parser can only parse structured messages",
            text,
        ))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
