use crate::support::{ScriptedAgent, SleepTool, action, finish};
use serde_json::json;
use std::sync::Arc;
use talaria::agent::{AgentExecutor, ExecutorConfig};
use talaria::schema::AgentDecision;
use talaria::tools::ToolRegistry;

/// Three concurrent actions whose tools complete in reverse order must still
/// record observations in action order.
#[tokio::test]
async fn observations_keep_action_order_under_reverse_completion() {
    let decision = AgentDecision::Act(vec![
        action("slow", json!({})),
        action("mid", json!({})),
        action("fast", json!({})),
    ]);
    let agent = Arc::new(ScriptedAgent::new(vec![Ok(decision), Ok(finish("done"))]));

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(SleepTool::new("slow", 60, "S")));
    registry.register(Box::new(SleepTool::new("mid", 30, "M")));
    registry.register(Box::new(SleepTool::new("fast", 5, "F")));

    let executor = AgentExecutor::new(agent, Arc::new(registry)).with_config(ExecutorConfig {
        return_intermediate_steps: true,
        ..ExecutorConfig::default()
    });

    let outcome = executor.run("fan out").await.expect("run");

    let observations: Vec<&str> = outcome
        .steps
        .iter()
        .map(|step| step.observation.as_str())
        .collect();
    assert_eq!(observations, vec!["S", "M", "F"]);
    // One decision, three tool invocations: one iteration, three steps.
    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.steps.len(), 3);
}

/// The batch runs concurrently: total wall-clock stays near the slowest
/// tool, not the sum of all three.
#[tokio::test]
async fn multi_action_dispatch_overlaps_tool_waits() {
    let decision = AgentDecision::Act(vec![
        action("a", json!({})),
        action("b", json!({})),
        action("c", json!({})),
    ]);
    let agent = Arc::new(ScriptedAgent::new(vec![Ok(decision), Ok(finish("done"))]));

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(SleepTool::new("a", 50, "A")));
    registry.register(Box::new(SleepTool::new("b", 50, "B")));
    registry.register(Box::new(SleepTool::new("c", 50, "C")));

    let executor = AgentExecutor::new(agent, Arc::new(registry));

    let started = std::time::Instant::now();
    executor.run("overlap").await.expect("run");
    assert!(started.elapsed() < std::time::Duration::from_millis(140));
}
