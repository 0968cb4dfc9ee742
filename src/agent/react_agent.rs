use super::stopping::StopReason;
use super::traits::Agent;
use crate::error::{AgentError, OutputParseError};
use crate::llm::{Provider, ProviderMessage};
use crate::parser::{OutputParser, ReactParser};
use crate::schema::{AgentDecision, AgentFinish, AgentStep};
use crate::tools::ToolSpec;
use async_trait::async_trait;
use std::sync::Arc;

/// Free-text decision convention advertised to models without native tool
/// calling.
const FORMAT_INSTRUCTIONS: &str = "\
Answer the following questions as best you can. You have access to the following tools:

{tools}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question";

const FINAL_ANSWER_NUDGE: &str =
    "\nThought: I must stop now and respond with a final answer based on the steps so far.";

/// Decision-maker using the `Action:` / `Final Answer:` free-text convention.
pub struct ReactAgent {
    provider: Arc<dyn Provider>,
    tools: Vec<ToolSpec>,
    model: String,
    temperature: f64,
    parser: ReactParser,
}

impl ReactAgent {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Vec<ToolSpec>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            tools,
            model: model.into(),
            temperature: 0.0,
            parser: ReactParser::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    fn system_prompt(&self) -> String {
        let tool_lines: Vec<String> = self
            .tools
            .iter()
            .map(|spec| format!("{}: {}", spec.name, spec.description))
            .collect();
        let tool_names: Vec<&str> = self.tools.iter().map(|spec| spec.name.as_str()).collect();
        FORMAT_INSTRUCTIONS
            .replace("{tools}", &tool_lines.join("\n"))
            .replace("{tool_names}", &tool_names.join(", "))
    }

    /// Replay history as the transcript the model produced it in.
    fn scratchpad(steps: &[AgentStep]) -> String {
        let mut text = String::new();
        for step in steps {
            text.push_str(step.action.log.trim_end());
            text.push_str("\nObservation: ");
            text.push_str(&step.observation);
            text.push_str("\nThought: ");
        }
        text
    }

    fn user_message(input: &str, steps: &[AgentStep]) -> String {
        let scratchpad = Self::scratchpad(steps);
        if scratchpad.is_empty() {
            format!("Question: {input}\nThought: ")
        } else {
            format!("Question: {input}\n{scratchpad}")
        }
    }
}

#[async_trait]
impl Agent for ReactAgent {
    async fn plan(&self, input: &str, steps: &[AgentStep]) -> Result<AgentDecision, AgentError> {
        let messages = vec![ProviderMessage::user(Self::user_message(input, steps))];
        let response = self
            .provider
            .chat(
                Some(&self.system_prompt()),
                &messages,
                &self.model,
                self.temperature,
            )
            .await?;
        Ok(self.parser.parse(&response.text)?)
    }

    async fn plan_final(
        &self,
        input: &str,
        steps: &[AgentStep],
        _reason: StopReason,
    ) -> Result<AgentFinish, AgentError> {
        let prompt = format!("{}{FINAL_ANSWER_NUDGE}", Self::user_message(input, steps));
        let messages = vec![ProviderMessage::user(prompt)];
        let response = self
            .provider
            .chat(
                Some(&self.system_prompt()),
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
        // Use a well-formed final answer when the model produced one; any
        // lingering action request is ignored and the raw text stands in.
        match self.parser.parse(&response.text) {
            Ok(AgentDecision::Finish(finish)) => Ok(finish),
            _ => Ok(AgentFinish::from_output(response.text)),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
