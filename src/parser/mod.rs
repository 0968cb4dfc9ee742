//! Converts raw model output into typed agent decisions.
//!
//! Two conventions are supported: structured tool-call descriptors on the
//! provider response, and the free-text `Action:` / `Final Answer:`
//! convention. Tool-input text that is itself a small structured expression
//! is handled by the [`expression`] sub-parser.

pub mod expression;
mod react;
mod tool_call;

pub use react::ReactParser;
pub use tool_call::ToolCallParser;

use crate::error::OutputParseError;
use crate::schema::AgentDecision;

/// Pure conversion from one raw model output to a typed decision.
pub trait OutputParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<AgentDecision, OutputParseError>;
}
