#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use talaria::agent::{Agent, AgentExecutor, ReactAgent, StopCondition, ToolCallingAgent};
use talaria::cli::{Cli, Command};
use talaria::config::Config;
use talaria::llm::OpenAiProvider;
use talaria::tools::{FileReadTool, ShellTool, ToolRegistry};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    let config = Config::load_or_init()?;
    dispatch(cli, config).await
}

fn build_registry(config: &Config) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ShellTool::new(config.workspace_dir.clone())));
    registry.register(Box::new(FileReadTool::new(config.workspace_dir.clone())));
    registry
}

async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Command::Run {
            task,
            model,
            react,
            max_iterations,
            steps,
        } => run_task(&config, &task, model, react, max_iterations, steps).await,
        Command::Tools => {
            for spec in build_registry(&config).specs() {
                println!("{}: {}", spec.name, spec.description);
            }
            Ok(())
        }
    }
}

async fn run_task(
    config: &Config,
    task: &str,
    model: Option<String>,
    react: bool,
    max_iterations: Option<u32>,
    show_steps: bool,
) -> Result<()> {
    let registry = Arc::new(build_registry(config));
    let provider = Arc::new(OpenAiProvider::new(
        config.api_key.as_deref(),
        config.base_url.as_deref(),
    ));
    let model = model.unwrap_or_else(|| config.default_model.clone());
    let specs = registry.specs();

    let agent: Arc<dyn Agent> = if react {
        Arc::new(
            ReactAgent::new(provider, specs, model).with_temperature(config.default_temperature),
        )
    } else {
        Arc::new(
            ToolCallingAgent::new(provider, specs, model)
                .with_temperature(config.default_temperature),
        )
    };

    let mut executor_config = config.executor.to_executor_config();
    if let Some(limit) = max_iterations {
        executor_config.stopping.max_iterations = Some(limit);
    }
    if show_steps {
        executor_config.return_intermediate_steps = true;
    }

    let executor = AgentExecutor::new(agent, registry).with_config(executor_config);
    let outcome = executor.run(task).await?;

    match outcome.output() {
        Some(answer) => println!("{answer}"),
        None => println!("{}", serde_json::to_string_pretty(&outcome.values)?),
    }
    if outcome.stop != StopCondition::Finished {
        eprintln!("(stopped early: {:?})", outcome.stop);
    }
    if show_steps {
        for (index, step) in outcome.steps.iter().enumerate() {
            eprintln!(
                "step {index}: {}({}) -> {}",
                step.action.tool,
                step.action.tool_input,
                step.observation.lines().next().unwrap_or_default()
            );
        }
    }
    Ok(())
}
