use crate::support::{EchoTool, ScriptedAgent, echo_action};
use std::sync::Arc;
use talaria::agent::{
    AgentExecutor, EarlyStoppingMethod, ExecutorConfig, STOPPED_BY_ITERATION_LIMIT,
    StopCondition, StoppingConfig,
};
use talaria::schema::AgentFinish;
use talaria::tools::ToolRegistry;

fn executor(agent: Arc<ScriptedAgent>, method: EarlyStoppingMethod) -> AgentExecutor {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(EchoTool));
    AgentExecutor::new(agent, Arc::new(registry)).with_config(ExecutorConfig {
        stopping: StoppingConfig {
            max_iterations: Some(2),
            max_execution_time: None,
            early_stopping_method: method,
        },
        return_intermediate_steps: true,
        ..ExecutorConfig::default()
    })
}

#[tokio::test]
async fn force_synthesizes_canned_finish_without_extra_call() {
    let agent = Arc::new(ScriptedAgent::repeating(echo_action()));
    let outcome = executor(agent.clone(), EarlyStoppingMethod::Force)
        .run("busy work")
        .await
        .expect("run");

    assert_eq!(outcome.stop, StopCondition::IterationLimit);
    assert_eq!(outcome.output(), Some(STOPPED_BY_ITERATION_LIMIT));
    assert_eq!(agent.plan_call_count(), 2);
    assert_eq!(agent.final_call_count(), 0);
}

#[tokio::test]
async fn generate_issues_exactly_one_finish_only_call() {
    let agent = Arc::new(
        ScriptedAgent::repeating(echo_action())
            .with_final(AgentFinish::from_output("best effort summary")),
    );
    let outcome = executor(agent.clone(), EarlyStoppingMethod::Generate)
        .run("busy work")
        .await
        .expect("run");

    assert_eq!(outcome.stop, StopCondition::IterationLimit);
    assert_eq!(outcome.output(), Some("best effort summary"));
    assert_eq!(agent.plan_call_count(), 2);
    assert_eq!(agent.final_call_count(), 1);
}

#[tokio::test]
async fn generate_falls_back_to_canned_when_final_call_fails() {
    let agent = Arc::new(ScriptedAgent::repeating(echo_action()).with_failing_final());
    let outcome = executor(agent.clone(), EarlyStoppingMethod::Generate)
        .run("busy work")
        .await
        .expect("run never raises on final failure");

    assert_eq!(outcome.stop, StopCondition::IterationLimit);
    assert_eq!(outcome.output(), Some(STOPPED_BY_ITERATION_LIMIT));
    assert_eq!(agent.final_call_count(), 1);
}

#[tokio::test]
async fn limit_stop_still_returns_history_when_requested() {
    let agent = Arc::new(ScriptedAgent::repeating(echo_action()));
    let outcome = executor(agent, EarlyStoppingMethod::Force)
        .run("busy work")
        .await
        .expect("run");

    assert_eq!(outcome.steps.len(), 2);
    assert!(outcome.steps.iter().all(|step| step.observation == "hello"));
}
