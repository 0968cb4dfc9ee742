use super::stopping::StopReason;
use crate::error::AgentError;
use crate::schema::{AgentDecision, AgentFinish, AgentStep};
use async_trait::async_trait;

/// Canned finish text when an iteration limit forces the stop.
pub const STOPPED_BY_ITERATION_LIMIT: &str = "Agent stopped due to iteration limit.";
/// Canned finish text when a time limit forces the stop.
pub const STOPPED_BY_TIME_LIMIT: &str = "Agent stopped due to time limit.";

/// The decision-making policy driven by the executor.
///
/// Implementations may be LLM-backed or fully scripted; the executor is
/// agnostic. `plan` receives the original input and the full ordered history
/// of (action, observation) steps so far.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn plan(&self, input: &str, steps: &[AgentStep]) -> Result<AgentDecision, AgentError>;

    /// One extra, finish-only decision call used by the `Generate` early
    /// stopping method. Implementations must not request further tool use.
    /// The default produces the canned stopped message.
    async fn plan_final(
        &self,
        input: &str,
        steps: &[AgentStep],
        reason: StopReason,
    ) -> Result<AgentFinish, AgentError> {
        let _ = (input, steps);
        Ok(stopped_finish(reason))
    }
}

/// The canned finish for a limit-forced stop.
pub fn stopped_finish(reason: StopReason) -> AgentFinish {
    let message = match reason {
        StopReason::IterationLimit => STOPPED_BY_ITERATION_LIMIT,
        StopReason::TimeLimit => STOPPED_BY_TIME_LIMIT,
    };
    AgentFinish::from_output(message)
}
