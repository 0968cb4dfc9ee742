//! Provider glue: the neutral chat-message model and one OpenAI-compatible
//! HTTP client. The executor is agnostic to all of this; it only sees
//! [`crate::agent::Agent`] decisions.

pub mod openai;
pub mod traits;
pub mod types;

pub use openai::OpenAiProvider;
pub use traits::Provider;
pub use types::{ContentBlock, MessageRole, ProviderMessage, ProviderResponse, ToolCall};
