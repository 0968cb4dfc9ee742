use super::traits::Provider;
use super::types::{ContentBlock, MessageRole, ProviderMessage, ProviderResponse, ToolCall};
use crate::error::ProviderError;
use crate::tools::ToolSpec;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible chat-completions client.
///
/// Works against any endpoint speaking the same wire format; point
/// `base_url` at a local or proxy server to swap backends.
pub struct OpenAiProvider {
    /// Pre-computed `"Bearer <key>"` header value (avoids `format!` per request).
    cached_auth_header: Option<String>,
    base_url: String,
    client: Client,
}

// ── Wire format ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Clone, Serialize)]
struct WireTool {
    r#type: &'static str,
    function: WireToolDefinition,
}

#[derive(Debug, Clone, Serialize)]
struct WireToolDefinition {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    r#type: String,
    function: WireToolCallFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireToolCallFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

// ── Implementation ───────────────────────────────────────────────────────────

impl OpenAiProvider {
    pub fn new(api_key: Option<&str>, base_url: Option<&str>) -> Self {
        Self {
            cached_auth_header: api_key.map(|k| format!("Bearer {k}")),
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .connect_timeout(std::time::Duration::from_secs(10))
                .pool_max_idle_per_host(10)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn map_message(message: &ProviderMessage) -> Vec<WireMessage> {
        let mut text_parts = Vec::new();
        let mut assistant_calls = Vec::new();
        let mut tool_messages = Vec::new();

        for block in &message.content {
            match block {
                ContentBlock::Text { text } => text_parts.push(text.clone()),
                ContentBlock::ToolCall {
                    id,
                    name,
                    arguments,
                } => assistant_calls.push(WireToolCall {
                    id: id.clone(),
                    r#type: "function".to_string(),
                    function: WireToolCallFunction {
                        name: name.clone(),
                        arguments: arguments.clone(),
                    },
                }),
                ContentBlock::ToolResult {
                    call_id, content, ..
                } => tool_messages.push(WireMessage {
                    role: "tool",
                    content: Some(content.clone()),
                    tool_call_id: Some(call_id.clone()),
                    tool_calls: None,
                }),
            }
        }

        let text_content = if text_parts.is_empty() {
            None
        } else {
            Some(text_parts.join("\n"))
        };

        let mut messages = Vec::new();
        match message.role {
            MessageRole::Assistant => {
                if text_content.is_some() || !assistant_calls.is_empty() {
                    messages.push(WireMessage {
                        role: "assistant",
                        content: text_content,
                        tool_call_id: None,
                        tool_calls: if assistant_calls.is_empty() {
                            None
                        } else {
                            Some(assistant_calls)
                        },
                    });
                }
            }
            MessageRole::User => {
                if let Some(text) = text_content {
                    messages.push(WireMessage {
                        role: "user",
                        content: Some(text),
                        tool_call_id: None,
                        tool_calls: None,
                    });
                }
            }
            MessageRole::System => {
                if let Some(text) = text_content {
                    messages.push(WireMessage {
                        role: "system",
                        content: Some(text),
                        tool_call_id: None,
                        tool_calls: None,
                    });
                }
            }
        }
        messages.extend(tool_messages);
        messages
    }

    fn build_request(
        system_prompt: Option<&str>,
        messages: &[ProviderMessage],
        tools: &[ToolSpec],
        model: &str,
        temperature: f64,
    ) -> ChatRequest {
        let mut wire_messages = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = system_prompt {
            wire_messages.push(WireMessage {
                role: "system",
                content: Some(system.to_string()),
                tool_call_id: None,
                tool_calls: None,
            });
        }
        for message in messages {
            wire_messages.extend(Self::map_message(message));
        }

        let wire_tools = if tools.is_empty() {
            None
        } else {
            Some(
                tools
                    .iter()
                    .map(|spec| WireTool {
                        r#type: "function",
                        function: WireToolDefinition {
                            name: spec.name.clone(),
                            description: spec.description.clone(),
                            parameters: spec.parameters.clone(),
                        },
                    })
                    .collect(),
            )
        };

        ChatRequest {
            model: model.to_string(),
            messages: wire_messages,
            temperature,
            tools: wire_tools,
        }
    }

    fn request_error(&self, message: impl Into<String>) -> ProviderError {
        ProviderError::Request {
            provider: self.name().to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat_with_tools(
        &self,
        system_prompt: Option<&str>,
        messages: &[ProviderMessage],
        tools: &[ToolSpec],
        model: &str,
        temperature: f64,
    ) -> Result<ProviderResponse, ProviderError> {
        let request = Self::build_request(system_prompt, messages, tools, model, temperature);

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request);
        if let Some(auth) = &self.cached_auth_header {
            builder = builder.header("Authorization", auth);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.request_error(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Auth {
                provider: self.name().to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.request_error(format!("HTTP {status}: {body}")));
        }

        let decoded: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::Malformed {
                    provider: self.name().to_string(),
                    message: e.to_string(),
                })?;

        let Some(choice) = decoded.choices.into_iter().next() else {
            return Err(ProviderError::Malformed {
                provider: self.name().to_string(),
                message: "response carried no choices".to_string(),
            });
        };

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        Ok(ProviderResponse {
            text: choice.message.content.unwrap_or_default(),
            tool_calls,
            model: decoded.model,
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
