use super::stopping::StopReason;
use super::traits::Agent;
use crate::error::{AgentError, OutputParseError};
use crate::llm::{Provider, ProviderMessage, ProviderResponse, ToolCall};
use crate::parser::ToolCallParser;
use crate::schema::{AgentDecision, AgentFinish, AgentStep};
use async_trait::async_trait;
use std::sync::Arc;

const FINAL_ANSWER_INSTRUCTION: &str =
    "Tools are no longer available. Respond with your final answer to the original question.";

/// Decision-maker backed by a provider with native tool-call descriptors.
///
/// History replay uses deterministic per-step call ids so identical runs
/// produce identical message transcripts.
pub struct ToolCallingAgent {
    provider: Arc<dyn Provider>,
    tools: Vec<crate::tools::ToolSpec>,
    model: String,
    temperature: f64,
    system_prompt: Option<String>,
    parser: ToolCallParser,
}

impl ToolCallingAgent {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Vec<crate::tools::ToolSpec>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            tools,
            model: model.into(),
            temperature: 0.0,
            system_prompt: None,
            parser: ToolCallParser::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    fn build_messages(input: &str, steps: &[AgentStep]) -> Vec<ProviderMessage> {
        let mut messages = Vec::with_capacity(1 + steps.len() * 2);
        messages.push(ProviderMessage::user(input));

        for (index, step) in steps.iter().enumerate() {
            let call_id = format!("call_{index}");
            let response = ProviderResponse {
                text: String::new(),
                tool_calls: vec![ToolCall {
                    id: call_id.clone(),
                    name: step.action.tool.clone(),
                    arguments: step.action.tool_input.to_string(),
                }],
                model: None,
            };
            messages.push(response.to_assistant_message());
            messages.push(ProviderMessage::tool_result(
                call_id,
                step.observation.clone(),
                false,
            ));
        }

        messages
    }
}

#[async_trait]
impl Agent for ToolCallingAgent {
    async fn plan(&self, input: &str, steps: &[AgentStep]) -> Result<AgentDecision, AgentError> {
        let messages = Self::build_messages(input, steps);
        let response = self
            .provider
            .chat_with_tools(
                self.system_prompt.as_deref(),
                &messages,
                &self.tools,
                &self.model,
                self.temperature,
            )
            .await?;
        Ok(self.parser.parse_response(&response)?)
    }

    async fn plan_final(
        &self,
        input: &str,
        steps: &[AgentStep],
        _reason: StopReason,
    ) -> Result<AgentFinish, AgentError> {
        let mut messages = Self::build_messages(input, steps);
        messages.push(ProviderMessage::user(FINAL_ANSWER_INSTRUCTION));

        // Finish-only call: tools are not advertised, and any call the model
        // still attempts is ignored in favour of its text.
        let response = self
            .provider
            .chat(
                self.system_prompt.as_deref(),
                &messages,
                &self.model,
                self.temperature,
            )
            .await?;

        if response.text.trim().is_empty() {
            return Err(OutputParseError::new(
                "finish-only call produced no text",
                response.text,
            )
            .into());
        }
        Ok(AgentFinish::from_output(response.text))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
