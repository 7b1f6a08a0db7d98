//! CLI module for agentflow
//!
//! Argument parsing and the single-query / interactive drivers used by the
//! `agentflow` binary. Uses clap for argument parsing and owo-colors for
//! colored terminal output.

pub mod output;

use crate::types::Result;
use crate::utils::config::AgentflowConfig;
use crate::workflows::engine::WorkflowEngine;
use clap::Parser;
use futures::StreamExt;
use output::Output;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

/// agentflow - supervisor-driven multi-agent workflow
#[derive(Parser, Debug)]
#[command(
    name = "agentflow",
    version,
    about = "Route a request through enhancer, researcher and coder agents until a validator accepts the answer",
    after_help = "EXAMPLES:\n    \
                  agentflow -q \"What is 2+2?\"             # Single query, print the final answer\n    \
                  agentflow -q \"Latest Rust release?\" -v  # Show every agent step\n    \
                  agentflow -i                            # Interactive session\n    \
                  agentflow -i --provider ollama          # Use a local Ollama model"
)]
pub struct Cli {
    /// Run a single query and print the final answer
    #[arg(short, long)]
    pub query: Option<String>,

    /// Read queries from stdin until `exit` or `quit`
    #[arg(short, long)]
    pub interactive: bool,

    /// Print every agent step as it happens
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to the configuration file (defaults to ./agentflow.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// LLM provider: openai (Groq-compatible) or ollama
    #[arg(long)]
    pub provider: Option<String>,

    /// Model name (overrides config)
    #[arg(long)]
    pub model: Option<String>,

    /// Maximum agent steps per query (0 disables the limit)
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Fold command-line overrides into a loaded configuration.
    pub fn apply_overrides(&self, config: &mut AgentflowConfig) -> Result<()> {
        if let Some(provider) = &self.provider {
            config.llm.provider = provider.parse()?;
        }
        if let Some(model) = &self.model {
            config.llm.model = Some(model.clone());
        }
        if let Some(max_steps) = self.max_steps {
            config.workflow.max_steps = max_steps;
        }
        Ok(())
    }
}

/// Run one query to completion, printing either every step or only the answer.
pub async fn run_query(
    engine: &WorkflowEngine,
    query: &str,
    verbose: bool,
    out: &Output,
) -> Result<()> {
    if !verbose {
        let result = engine.run(query).await?;
        out.answer(&result.final_answer);
        return Ok(());
    }

    let mut events = std::pin::pin!(engine.stream(query));
    let mut steps = 0;
    let mut final_answer = String::new();
    while let Some(event) = events.next().await {
        let event = event?;
        steps += 1;
        out.node_event(&event);
        // the message judged by the validator is the one just before it
        if event.node != crate::workflows::graph::NodeId::Validator {
            final_answer = event.message.content.clone();
        }
    }
    out.newline();
    out.answer(&final_answer);
    out.hint(&format!("{} steps", steps));
    Ok(())
}

/// Interactive loop over stdin. Per-query errors are reported and the loop
/// continues; only a failure to read stdin ends it early.
pub async fn run_interactive(engine: &WorkflowEngine, verbose: bool, out: &Output) -> Result<()> {
    out.header("agentflow interactive session");
    out.hint("Type a request, or 'exit' / 'quit' to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        out.prompt();
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                return Err(crate::types::AppError::Internal(format!(
                    "Failed to read stdin: {}",
                    e
                )))
            }
        };

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        if let Err(e) = run_query(engine, query, verbose, out).await {
            out.error(&e.to_string());
        }
    }
    out.info("Goodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::ProviderKind;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "agentflow",
            "-q",
            "2+2?",
            "-v",
            "--provider",
            "ollama",
            "--max-steps",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.query.as_deref(), Some("2+2?"));
        assert!(cli.verbose);
        assert!(!cli.interactive);

        let mut config = AgentflowConfig::default();
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(config.llm.provider, ProviderKind::Ollama);
        assert_eq!(config.workflow.max_steps, 5);
    }

    #[test]
    fn test_bad_provider_override() {
        let cli = Cli::try_parse_from(["agentflow", "-i", "--provider", "smoke-signals"]).unwrap();
        let mut config = AgentflowConfig::default();
        assert!(cli.apply_overrides(&mut config).is_err());
    }
}
