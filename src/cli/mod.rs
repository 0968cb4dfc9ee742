use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "talaria", version, about = "Tool-using agent execution engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the agent on a task until it produces a final answer
    Run {
        /// The task to hand the agent
        task: String,
        /// Model override (defaults to the configured model)
        #[arg(long)]
        model: Option<String>,
        /// Use the free-text Action/Final Answer convention instead of
        /// native tool calling
        #[arg(long)]
        react: bool,
        /// Iteration cap override
        #[arg(long)]
        max_iterations: Option<u32>,
        /// Print each intermediate step after the answer
        #[arg(long)]
        steps: bool,
    },
    /// List the registered tools
    Tools,
}
