use super::OutputParser;
use super::expression;
use crate::error::OutputParseError;
use crate::schema::{AgentAction, AgentDecision, AgentFinish};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Marker introducing the terminal answer in free-text output.
pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Action\s*\d*\s*:[ \t]*(.+?)\s*\n+\s*Action\s*\d*\s*Input\s*\d*\s*:[ \t]*([\s\S]*)")
        .expect("action regex is valid")
});

/// Parser for the fixed free-text convention:
///
/// ```text
/// Action: <tool name>
/// Action Input: <input>
/// ```
///
/// or `Final Answer: <answer>`. Absence of either marker is a parse failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactParser;

impl ReactParser {
    pub fn new() -> Self {
        Self
    }

    /// Tool inputs are flat strings unless they look like a structured
    /// literal or call, in which case the expression grammar decodes them.
    /// An input that merely resembles a structure but fails to parse stays a
    /// flat string.
    fn decode_tool_input(text: &str) -> Value {
        let trimmed = text.trim();
        if !looks_structured(trimmed) {
            return Value::String(trimmed.to_string());
        }
        // Models usually emit plain JSON for object/array inputs; try that
        // before the expression grammar.
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            return value;
        }
        match expression::shared().parse(trimmed) {
            Ok(node) => node.to_value(),
            Err(_) => Value::String(trimmed.to_string()),
        }
    }
}

fn looks_structured(text: &str) -> bool {
    if text.starts_with('{') || text.starts_with('[') {
        return true;
    }
    // `name(...)` call shape.
    let Some(paren) = text.find('(') else {
        return false;
    };
    text.ends_with(')')
        && !text[..paren].is_empty()
        && text[..paren]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$')
}

impl OutputParser for ReactParser {
    fn parse(&self, text: &str) -> Result<AgentDecision, OutputParseError> {
        let action_captures = ACTION_RE.captures(text);
        let has_final_answer = text.contains(FINAL_ANSWER_MARKER);

        if let Some(captures) = action_captures {
            if has_final_answer {
                return Err(OutputParseError::new(
                    "output contains both an action and a final answer",
                    text,
                ));
            }

            let tool = captures[1]
                .trim()
                .trim_matches(|c| c == '"' || c == '\'' || c == '`')
                .to_string();
            let mut input_text = captures[2].trim();
            // Cut off anything the model hallucinated past its own input.
            if let Some(pos) = input_text.find("\nObservation") {
                input_text = input_text[..pos].trim_end();
            }

            return Ok(AgentDecision::single(AgentAction {
                tool,
                tool_input: Self::decode_tool_input(input_text),
                log: text.to_string(),
            }));
        }

        if has_final_answer {
            let answer = text
                .rsplit(FINAL_ANSWER_MARKER)
                .next()
                .unwrap_or_default()
                .trim();
            let mut finish = AgentFinish::from_output(answer);
            finish.log = text.to_string();
            return Ok(AgentDecision::Finish(finish));
        }

        Err(OutputParseError::new(
            "output carries neither an Action nor a Final Answer marker",
            text,
        ))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
