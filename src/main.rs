//! agentflow CLI entry point
//!
//! - `agentflow -q "<request>"` - run one request and print the answer
//! - `agentflow -i` - interactive session
//!
//! Exit codes: 0 on success, 1 when a run or setup fails, 2 when neither
//! `--query` nor `--interactive` was given.

use agentflow::cli::{self, output::Output, Cli};
use agentflow::{AgentflowConfig, WorkflowEngine};
use clap::CommandFactory;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();

    let default_filter = if cli.verbose {
        "agentflow=debug"
    } else {
        "agentflow=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let out = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if cli.query.is_none() && !cli.interactive {
        eprintln!("{}", Cli::command().render_help());
        return ExitCode::from(2);
    }

    match run(cli, &out).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            out.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, out: &Output) -> anyhow::Result<()> {
    let mut config = AgentflowConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config)?;

    let engine = WorkflowEngine::from_config(&config)?;

    if let Some(query) = cli.query.as_deref() {
        cli::run_query(&engine, query, cli.verbose, out).await?;
    }
    if cli.interactive {
        cli::run_interactive(&engine, cli.verbose, out).await?;
    }
    Ok(())
}
