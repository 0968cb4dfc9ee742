use super::hooks::RunHook;
use super::stopping::{EarlyStoppingMethod, StopReason, StoppingConfig, should_stop};
use super::traits::{Agent, stopped_finish};
use crate::error::AgentError;
use crate::schema::{AgentAction, AgentDecision, AgentFinish, AgentStep};
use crate::tools::{EXCEPTION_TOOL_NAME, ExceptionTool, Tool, ToolRegistry};
use futures_util::future::join_all;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

// ── Parsing-error policy ─────────────────────────────────────────────────────

/// Observation text used when a parse failure is recovered with no custom
/// message configured.
pub const DEFAULT_PARSE_FAILURE_OBSERVATION: &str = "Invalid or incomplete response";

/// How the loop recovers when model output or tool input cannot be parsed.
#[derive(Clone)]
pub enum ParsingErrorPolicy {
    /// Surface the error to the caller, aborting the run.
    Raise,
    /// Feed a fixed observation back to the decision-maker.
    FixedText(String),
    /// Derive the observation from the error.
    Custom(Arc<dyn Fn(&AgentError) -> String + Send + Sync>),
}

impl ParsingErrorPolicy {
    /// The recoverable default: a fixed generic observation.
    pub fn fixed_default() -> Self {
        Self::FixedText(DEFAULT_PARSE_FAILURE_OBSERVATION.to_string())
    }

    /// The observation this policy substitutes for the error, or `None` when
    /// the error must be raised.
    fn observation_for(&self, error: &AgentError) -> Option<String> {
        match self {
            Self::Raise => None,
            Self::FixedText(text) => Some(text.clone()),
            Self::Custom(handler) => Some(handler(error)),
        }
    }
}

impl Default for ParsingErrorPolicy {
    fn default() -> Self {
        Self::fixed_default()
    }
}

impl std::fmt::Debug for ParsingErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raise => write!(f, "Raise"),
            Self::FixedText(text) => f.debug_tuple("FixedText").field(text).finish(),
            Self::Custom(_) => write!(f, "Custom(<handler>)"),
        }
    }
}

// ── Configuration and results ────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ExecutorConfig {
    pub stopping: StoppingConfig,
    pub parsing_errors: ParsingErrorPolicy,
    pub return_intermediate_steps: bool,
    /// Raise `UnknownToolError` instead of feeding an observation back when
    /// an action names a tool absent from the registry.
    pub fail_on_unknown_tool: bool,
}

/// How the run terminated. Limit stops still carry a finish; the condition
/// only records provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCondition {
    Finished,
    IterationLimit,
    TimeLimit,
}

impl From<StopReason> for StopCondition {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::IterationLimit => Self::IterationLimit,
            StopReason::TimeLimit => Self::TimeLimit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub values: Map<String, Value>,
    /// Populated only when `return_intermediate_steps` is set.
    pub steps: Vec<AgentStep>,
    pub stop: StopCondition,
    /// Completed action/observation cycles.
    pub iterations: u32,
}

impl AgentOutcome {
    /// The `output` value, if present and textual.
    pub fn output(&self) -> Option<&str> {
        self.values.get(crate::schema::OUTPUT_KEY).and_then(Value::as_str)
    }
}

/// Parameters for a single [`AgentExecutor::run_with`] invocation.
pub struct RunParams<'a> {
    pub input: &'a str,
    /// External abort signal; triggering it resolves the run as cancelled.
    pub cancel: Option<CancellationToken>,
    /// Absolute deadline; passing it resolves the run as cancelled.
    pub deadline: Option<tokio::time::Instant>,
    pub hooks: &'a [Arc<dyn RunHook>],
}

impl<'a> RunParams<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            cancel: None,
            deadline: None,
            hooks: &[],
        }
    }
}

// ── Executor ─────────────────────────────────────────────────────────────────

/// Per-run mutable state, owned exclusively by one `run_with` invocation.
struct RunState {
    steps: Vec<AgentStep>,
    iterations: u32,
}

/// Drives a decision-maker and a tool registry to a final answer.
///
/// The loop is single-threaded cooperative: one decision call in flight at a
/// time; the tool invocations of one multi-action decision run concurrently.
pub struct AgentExecutor {
    agent: Arc<dyn Agent>,
    registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
    exception_tool: ExceptionTool,
}

impl AgentExecutor {
    pub fn new(agent: Arc<dyn Agent>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            agent,
            registry,
            config: ExecutorConfig::default(),
            exception_tool: ExceptionTool::new(),
        }
    }

    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run to completion with defaults: no cancellation, no hooks.
    pub async fn run(&self, input: &str) -> Result<AgentOutcome, AgentError> {
        self.run_with(RunParams::new(input)).await
    }

    /// Run the agent loop to completion.
    pub async fn run_with(&self, params: RunParams<'_>) -> Result<AgentOutcome, AgentError> {
        let run_id = Uuid::new_v4();
        let cancel = params.cancel.clone().unwrap_or_default();
        let started = Instant::now();
        let mut state = RunState {
            steps: Vec::new(),
            iterations: 0,
        };
        debug!(%run_id, input_len = params.input.len(), "starting agent run");

        loop {
            // Limits are consulted once per completed iteration; checking at
            // the loop top also lets a zero limit stop before the first
            // decision call.
            if let Some(reason) =
                should_stop(state.iterations, started.elapsed(), &self.config.stopping)
            {
                debug!(%run_id, ?reason, iterations = state.iterations, "limit reached");
                return self.early_stop(&params, state, reason, &cancel).await;
            }

            let planned = cancellable(
                &cancel,
                params.deadline,
                self.agent.plan(params.input, &state.steps),
            )
            .await?;

            let decision = match planned {
                Ok(decision) => decision,
                Err(error @ AgentError::OutputParsing(_)) => {
                    let Some(observation) = self.config.parsing_errors.observation_for(&error)
                    else {
                        return Err(error);
                    };
                    warn!(%run_id, %error, "recovering from unparsable output");
                    let step = self.exception_step(&error, observation).await;
                    for hook in params.hooks {
                        hook.on_step(&step).await;
                    }
                    state.steps.push(step);
                    state.iterations += 1;
                    continue;
                }
                Err(error) => return Err(error),
            };

            let actions = match decision {
                AgentDecision::Finish(finish) => {
                    return Ok(self
                        .finish(state, finish, StopCondition::Finished, params.hooks)
                        .await);
                }
                AgentDecision::Act(actions) => actions,
            };

            for action in &actions {
                for hook in params.hooks {
                    hook.on_action(action).await;
                }
            }

            // Tool invocations of one decision are independent; dispatch them
            // together and keep observations in action order regardless of
            // completion order.
            let dispatch = join_all(actions.iter().map(|action| self.perform_action(action)));
            let results = cancellable(&cancel, params.deadline, dispatch).await?;

            for (action, result) in actions.into_iter().zip(results) {
                let observation = result?;
                let step = AgentStep {
                    action,
                    observation,
                };
                for hook in params.hooks {
                    hook.on_step(&step).await;
                }
                state.steps.push(step);
            }
            state.iterations += 1;
        }
    }

    /// Resolve and invoke one action's tool, applying the unknown-tool and
    /// parsing-error policies.
    async fn perform_action(&self, action: &AgentAction) -> Result<String, AgentError> {
        let Some(tool) = self.registry.get(&action.tool) else {
            if self.config.fail_on_unknown_tool {
                return Err(AgentError::UnknownTool {
                    name: action.tool.clone(),
                });
            }
            // The agent's own self-correction signal, not a loop failure.
            warn!(tool = %action.tool, "action named an unknown tool");
            return Ok(format!(
                "{} is not a valid tool; valid tools are: {}",
                action.tool,
                self.registry.tool_names().join(", ")
            ));
        };

        match tool.execute(action.tool_input.clone()).await {
            Ok(observation) => Ok(observation),
            Err(tool_error) => {
                let error = AgentError::Tool(tool_error);
                match self.config.parsing_errors.observation_for(&error) {
                    Some(observation) => {
                        warn!(tool = %action.tool, %error, "recovering from tool failure");
                        Ok(observation)
                    }
                    None => Err(error),
                }
            }
        }
    }

    /// Record a parse failure as if the exception tool had been invoked.
    async fn exception_step(&self, error: &AgentError, observation: String) -> AgentStep {
        let action = AgentAction {
            tool: EXCEPTION_TOOL_NAME.to_string(),
            tool_input: Value::String(observation.clone()),
            log: error.to_string(),
        };
        let echoed = self
            .exception_tool
            .execute(Value::String(observation.clone()))
            .await
            .unwrap_or(observation);
        AgentStep {
            action,
            observation: echoed,
        }
    }

    /// Produce the limit-stop finish per the configured early-stopping method.
    async fn early_stop(
        &self,
        params: &RunParams<'_>,
        state: RunState,
        reason: StopReason,
        cancel: &CancellationToken,
    ) -> Result<AgentOutcome, AgentError> {
        let finish = match self.config.stopping.early_stopping_method {
            EarlyStoppingMethod::Force => stopped_finish(reason),
            EarlyStoppingMethod::Generate => {
                let planned = cancellable(
                    cancel,
                    params.deadline,
                    self.agent.plan_final(params.input, &state.steps, reason),
                )
                .await?;
                match planned {
                    Ok(finish) => finish,
                    Err(error) => {
                        warn!(%error, "finish-only call failed; using canned stop message");
                        stopped_finish(reason)
                    }
                }
            }
        };
        Ok(self.finish(state, finish, reason.into(), params.hooks).await)
    }

    async fn finish(
        &self,
        state: RunState,
        finish: AgentFinish,
        stop: StopCondition,
        hooks: &[Arc<dyn RunHook>],
    ) -> AgentOutcome {
        for hook in hooks {
            hook.on_finish(&finish.return_values).await;
        }
        debug!(?stop, iterations = state.iterations, "agent run finished");
        let steps = if self.config.return_intermediate_steps {
            state.steps
        } else {
            Vec::new()
        };
        AgentOutcome {
            values: finish.return_values,
            steps,
            stop,
            iterations: state.iterations,
        }
    }
}

/// Await a future, resolving early as `Cancelled` on the abort signal or
/// deadline. Dropping the future cancels whatever was in flight.
async fn cancellable<T>(
    cancel: &CancellationToken,
    deadline: Option<tokio::time::Instant>,
    future: impl Future<Output = T>,
) -> Result<T, AgentError> {
    tokio::pin!(future);
    let deadline_passed = async {
        match deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::select! {
        () = cancel.cancelled() => Err(AgentError::Cancelled),
        () = deadline_passed => Err(AgentError::Cancelled),
        value = &mut future => Ok(value),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
