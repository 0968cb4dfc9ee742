use super::types::{ProviderMessage, ProviderResponse};
use crate::error::ProviderError;
use crate::tools::ToolSpec;
use async_trait::async_trait;

/// A chat-completion backend.
///
/// Implementations map the neutral message model to their wire format. The
/// executor never talks to a provider directly; it goes through an
/// [`crate::agent::Agent`] implementation.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "openai").
    fn name(&self) -> &str;

    /// One chat round-trip with tool specs advertised to the model.
    async fn chat_with_tools(
        &self,
        system_prompt: Option<&str>,
        messages: &[ProviderMessage],
        tools: &[ToolSpec],
        model: &str,
        temperature: f64,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Plain chat round-trip without tools.
    async fn chat(
        &self,
        system_prompt: Option<&str>,
        messages: &[ProviderMessage],
        model: &str,
        temperature: f64,
    ) -> Result<ProviderResponse, ProviderError> {
        self.chat_with_tools(system_prompt, messages, &[], model, temperature)
            .await
    }
}
