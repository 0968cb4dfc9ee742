use crate::schema::{AgentAction, AgentStep};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;

/// Lifecycle hook for an executor run.
///
/// Hooks are a pure side channel: they observe the run and never affect
/// control flow.
pub trait RunHook: Send + Sync + std::fmt::Debug {
    /// Called before each tool invocation.
    fn on_action<'a>(
        &'a self,
        action: &'a AgentAction,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

    /// Called after each (action, observation) pair is recorded.
    fn on_step<'a>(&'a self, step: &'a AgentStep)
    -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

    /// Called once with the run's final return values.
    fn on_finish<'a>(
        &'a self,
        values: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}
