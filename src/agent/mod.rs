//! The agent execution loop and its decision-maker seams.

pub mod executor;
pub mod hooks;
pub mod llm_agent;
pub mod react_agent;
pub mod stopping;
pub mod traits;

pub use executor::{
    AgentExecutor, AgentOutcome, DEFAULT_PARSE_FAILURE_OBSERVATION, ExecutorConfig,
    ParsingErrorPolicy, RunParams, StopCondition,
};
pub use hooks::RunHook;
pub use llm_agent::ToolCallingAgent;
pub use react_agent::ReactAgent;
pub use stopping::{EarlyStoppingMethod, StopReason, StoppingConfig, should_stop};
pub use traits::{Agent, STOPPED_BY_ITERATION_LIMIT, STOPPED_BY_TIME_LIMIT, stopped_finish};
