use crate::support::{
    EchoTool, FailingTool, ScriptedAgent, SleepTool, act, echo_action, finish,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use talaria::agent::{
    AgentExecutor, EarlyStoppingMethod, ExecutorConfig, ParsingErrorPolicy, RunParams,
    STOPPED_BY_ITERATION_LIMIT, STOPPED_BY_TIME_LIMIT, StopCondition, StoppingConfig,
};
use talaria::error::AgentError;
use talaria::tools::{Tool, ToolRegistry};
use tokio_util::sync::CancellationToken;

fn registry(tools: Vec<Box<dyn Tool>>) -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    for tool in tools {
        registry.register(tool);
    }
    Arc::new(registry)
}

fn config_with_limit(max_iterations: u32) -> ExecutorConfig {
    ExecutorConfig {
        stopping: StoppingConfig {
            max_iterations: Some(max_iterations),
            max_execution_time: None,
            early_stopping_method: EarlyStoppingMethod::Force,
        },
        return_intermediate_steps: true,
        ..ExecutorConfig::default()
    }
}

#[tokio::test]
async fn immediate_finish_returns_values_unchanged() {
    let agent = Arc::new(ScriptedAgent::new(vec![Ok(finish("the answer is 4"))]));
    let executor = AgentExecutor::new(agent.clone(), registry(vec![]));

    let outcome = executor.run("what is 2+2?").await.expect("run");

    assert_eq!(outcome.output(), Some("the answer is 4"));
    assert_eq!(outcome.stop, StopCondition::Finished);
    assert_eq!(outcome.iterations, 0);
    assert!(outcome.steps.is_empty());
    assert_eq!(agent.plan_call_count(), 1);
}

#[tokio::test]
async fn action_then_finish_records_one_step() {
    let agent = Arc::new(ScriptedAgent::new(vec![
        Ok(echo_action()),
        Ok(finish("done")),
    ]));
    let executor = AgentExecutor::new(agent.clone(), registry(vec![Box::new(EchoTool)]))
        .with_config(config_with_limit(10));

    let outcome = executor.run("say hello").await.expect("run");

    assert_eq!(outcome.output(), Some("done"));
    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.steps.len(), 1);
    assert_eq!(outcome.steps[0].action.tool, "echo");
    assert_eq!(outcome.steps[0].observation, "hello");
    assert_eq!(agent.plan_call_count(), 2);
}

#[tokio::test]
async fn never_finishing_agent_is_forced_at_iteration_limit() {
    let agent = Arc::new(ScriptedAgent::repeating(echo_action()));
    let executor = AgentExecutor::new(agent.clone(), registry(vec![Box::new(EchoTool)]))
        .with_config(config_with_limit(3));

    let outcome = executor.run("loop forever").await.expect("run");

    assert_eq!(outcome.stop, StopCondition::IterationLimit);
    assert_eq!(outcome.iterations, 3);
    assert_eq!(outcome.steps.len(), 3);
    assert_eq!(outcome.output(), Some(STOPPED_BY_ITERATION_LIMIT));
    assert_eq!(agent.plan_call_count(), 3);
}

#[tokio::test]
async fn time_limit_forces_stop_with_time_provenance() {
    let agent = Arc::new(ScriptedAgent::repeating(act("nap", json!({}))));
    let executor = AgentExecutor::new(
        agent,
        registry(vec![Box::new(SleepTool::new("nap", 30, "rested"))]),
    )
    .with_config(ExecutorConfig {
        stopping: StoppingConfig {
            max_iterations: None,
            max_execution_time: Some(Duration::from_millis(5)),
            early_stopping_method: EarlyStoppingMethod::Force,
        },
        return_intermediate_steps: true,
        ..ExecutorConfig::default()
    });

    let outcome = executor.run("sleepy task").await.expect("run");

    assert_eq!(outcome.stop, StopCondition::TimeLimit);
    assert_eq!(outcome.output(), Some(STOPPED_BY_TIME_LIMIT));
    // The limit is only consulted between iterations, never mid-call.
    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.steps.len(), 1);
}

#[tokio::test]
async fn unknown_tool_becomes_self_correction_observation() {
    let agent = Arc::new(ScriptedAgent::new(vec![
        Ok(act("spellcheck", json!({}))),
        Ok(finish("recovered")),
    ]));
    let executor = AgentExecutor::new(agent, registry(vec![Box::new(EchoTool)]))
        .with_config(config_with_limit(5));

    let outcome = executor.run("use a bad tool").await.expect("run");

    assert_eq!(outcome.output(), Some("recovered"));
    let observation = &outcome.steps[0].observation;
    assert!(observation.contains("spellcheck is not a valid tool"));
    assert!(observation.contains("echo"));
}

#[tokio::test]
async fn unknown_tool_raises_in_hard_fail_mode() {
    let agent = Arc::new(ScriptedAgent::new(vec![Ok(act("spellcheck", json!({})))]));
    let executor = AgentExecutor::new(agent, registry(vec![Box::new(EchoTool)])).with_config(
        ExecutorConfig {
            fail_on_unknown_tool: true,
            ..config_with_limit(5)
        },
    );

    let error = executor.run("use a bad tool").await.unwrap_err();
    assert!(matches!(error, AgentError::UnknownTool { name } if name == "spellcheck"));
}

#[tokio::test]
async fn tool_failure_is_fed_back_under_default_policy() {
    let agent = Arc::new(ScriptedAgent::new(vec![
        Ok(act("broken", json!({}))),
        Ok(finish("moved on")),
    ]));
    let executor = AgentExecutor::new(agent, registry(vec![Box::new(FailingTool)]))
        .with_config(config_with_limit(5));

    let outcome = executor.run("try the broken tool").await.expect("run");

    assert_eq!(outcome.output(), Some("moved on"));
    assert!(!outcome.steps[0].observation.is_empty());
}

#[tokio::test]
async fn tool_failure_raises_under_raise_policy() {
    let agent = Arc::new(ScriptedAgent::new(vec![Ok(act("broken", json!({})))]));
    let executor = AgentExecutor::new(agent, registry(vec![Box::new(FailingTool)])).with_config(
        ExecutorConfig {
            parsing_errors: ParsingErrorPolicy::Raise,
            ..config_with_limit(5)
        },
    );

    let error = executor.run("try the broken tool").await.unwrap_err();
    assert!(matches!(error, AgentError::Tool(_)));
}

#[tokio::test]
async fn identical_runs_produce_identical_outcomes() {
    let run = || async {
        let agent = Arc::new(ScriptedAgent::new(vec![
            Ok(echo_action()),
            Ok(act("echo", json!({"text": "second"}))),
            Ok(finish("stable")),
        ]));
        let executor = AgentExecutor::new(agent, registry(vec![Box::new(EchoTool)]))
            .with_config(config_with_limit(10));
        executor.run("same input").await.expect("run")
    };

    let first = run().await;
    let second = run().await;

    assert_eq!(first.values, second.values);
    assert_eq!(first.steps, second.steps);
    assert_eq!(first.stop, second.stop);
    assert_eq!(first.iterations, second.iterations);
}

#[tokio::test]
async fn cancellation_token_aborts_run() {
    let agent = Arc::new(ScriptedAgent::repeating(act("nap", json!({}))));
    let executor = AgentExecutor::new(
        agent,
        registry(vec![Box::new(SleepTool::new("nap", 5_000, "never"))]),
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let error = executor
        .run_with(RunParams {
            cancel: Some(cancel),
            ..RunParams::new("slow task")
        })
        .await
        .unwrap_err();

    assert!(matches!(error, AgentError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn deadline_aborts_run() {
    let agent = Arc::new(ScriptedAgent::repeating(act("nap", json!({}))));
    let executor = AgentExecutor::new(
        agent,
        registry(vec![Box::new(SleepTool::new("nap", 5_000, "never"))]),
    );

    let error = executor
        .run_with(RunParams {
            deadline: Some(tokio::time::Instant::now() + Duration::from_millis(20)),
            ..RunParams::new("slow task")
        })
        .await
        .unwrap_err();

    assert!(matches!(error, AgentError::Cancelled));
}

#[tokio::test]
async fn steps_are_omitted_unless_requested() {
    let agent = Arc::new(ScriptedAgent::new(vec![
        Ok(echo_action()),
        Ok(finish("done")),
    ]));
    let executor = AgentExecutor::new(agent, registry(vec![Box::new(EchoTool)]));

    let outcome = executor.run("quiet run").await.expect("run");
    assert_eq!(outcome.iterations, 1);
    assert!(outcome.steps.is_empty());
}
