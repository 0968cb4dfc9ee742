use crate::support::{EchoTool, ScriptedAgent, finish};
use std::sync::Arc;
use talaria::agent::{
    AgentExecutor, DEFAULT_PARSE_FAILURE_OBSERVATION, EarlyStoppingMethod, ExecutorConfig,
    ParsingErrorPolicy, StopCondition, StoppingConfig,
};
use talaria::error::{AgentError, OutputParseError};
use talaria::tools::{EXCEPTION_TOOL_NAME, ToolRegistry};

fn executor_with_policy(
    agent: Arc<ScriptedAgent>,
    policy: ParsingErrorPolicy,
    max_iterations: u32,
) -> AgentExecutor {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(EchoTool));
    AgentExecutor::new(agent, Arc::new(registry)).with_config(ExecutorConfig {
        stopping: StoppingConfig {
            max_iterations: Some(max_iterations),
            max_execution_time: None,
            early_stopping_method: EarlyStoppingMethod::Force,
        },
        parsing_errors: policy,
        return_intermediate_steps: true,
        fail_on_unknown_tool: false,
    })
}

#[tokio::test]
async fn parse_failure_recovers_through_exception_step() {
    let agent = Arc::new(ScriptedAgent::new(vec![
        Err(OutputParseError::new("no markers", "mumbling").into()),
        Ok(finish("recovered")),
    ]));
    let executor = executor_with_policy(agent.clone(), ParsingErrorPolicy::default(), 10);

    let outcome = executor.run("fragile parse").await.expect("run");

    assert_eq!(outcome.output(), Some("recovered"));
    assert_eq!(outcome.steps.len(), 1);
    let step = &outcome.steps[0];
    assert_eq!(step.action.tool, EXCEPTION_TOOL_NAME);
    assert_eq!(step.observation, DEFAULT_PARSE_FAILURE_OBSERVATION);
    // The recovery cycle counts like any other iteration.
    assert_eq!(outcome.iterations, 1);
    assert_eq!(agent.plan_call_count(), 2);
}

#[tokio::test]
async fn always_failing_parser_never_raises_and_hits_limit() {
    let agent = Arc::new(ScriptedAgent::always_failing_parse());
    let executor = executor_with_policy(
        agent.clone(),
        ParsingErrorPolicy::FixedText("could not parse that".into()),
        4,
    );

    let outcome = executor.run("hopeless parse").await.expect("never raises");

    assert_eq!(outcome.stop, StopCondition::IterationLimit);
    assert_eq!(outcome.steps.len(), 4);
    for step in &outcome.steps {
        assert!(!step.observation.is_empty());
        assert_eq!(step.observation, "could not parse that");
    }
    assert_eq!(agent.plan_call_count(), 4);
}

#[tokio::test]
async fn custom_handler_derives_observation_from_error() {
    let agent = Arc::new(ScriptedAgent::new(vec![
        Err(OutputParseError::new("bad shape", "raw text").into()),
        Ok(finish("ok")),
    ]));
    let policy = ParsingErrorPolicy::Custom(Arc::new(|error| format!("handler saw: {error}")));
    let executor = executor_with_policy(agent, policy, 10);

    let outcome = executor.run("custom recovery").await.expect("run");

    let observation = &outcome.steps[0].observation;
    assert!(observation.starts_with("handler saw:"));
    assert!(observation.contains("bad shape"));
}

#[tokio::test]
async fn raise_policy_propagates_with_text_preserved() {
    let agent = Arc::new(ScriptedAgent::new(vec![
        Err(OutputParseError::new("no markers", "the verbatim output").into()),
    ]));
    let executor = executor_with_policy(agent, ParsingErrorPolicy::Raise, 10);

    let error = executor.run("strict parse").await.unwrap_err();

    let AgentError::OutputParsing(parse_error) = error else {
        panic!("expected parsing error, got {error}");
    };
    assert_eq!(parse_error.text, "the verbatim output");
}
