#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

//! Talaria — an agent execution engine.
//!
//! A decision-making process iteratively chooses and invokes tools until it
//! produces a final answer, with iteration/time limits and configurable
//! recovery from malformed model output.

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod parser;
pub mod schema;
pub mod tools;

pub use agent::{Agent, AgentExecutor, AgentOutcome, ExecutorConfig, ParsingErrorPolicy};
pub use config::Config;
pub use error::{AgentError, OutputParseError, Result, TalariaError, ToolError};
pub use schema::{AgentAction, AgentDecision, AgentFinish, AgentStep};
