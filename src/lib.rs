//! # agentflow
//!
//! A supervisor-driven multi-agent workflow. One request is routed through a
//! query enhancer, a web researcher and a coder under the control of a
//! supervisor, and a validator decides when the accumulated answer is good
//! enough to stop.
//!
//! agentflow can be used in two ways:
//!
//! 1. **As a CLI** - run the `agentflow` binary
//! 2. **As a library** - drive [`WorkflowEngine`] from your own code
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use agentflow::{AgentflowConfig, WorkflowEngine};
//!
//! #[tokio::main]
//! async fn main() -> agentflow::Result<()> {
//!     let config = AgentflowConfig::load(None)?;
//!     let engine = WorkflowEngine::from_config(&config)?;
//!
//!     let result = engine.run("What is 2 + 2?").await?;
//!     println!("{}", result.final_answer);
//!     Ok(())
//! }
//! ```
//!
//! ### Streaming
//!
//! ```rust,ignore
//! use futures::StreamExt;
//!
//! let mut events = std::pin::pin!(engine.stream("Latest Rust release?"));
//! while let Some(event) = events.next().await {
//!     let event = event?;
//!     println!("{} -> {}: {}", event.node, event.next, event.message.content);
//! }
//! ```
//!
//! ### Custom oracle
//!
//! Every node reasons through the [`Oracle`] trait. Supply your own to run
//! the workflow against something other than a chat model:
//!
//! ```rust,ignore
//! let engine = WorkflowEngine::from_oracle(oracle, research, coding, &Prompts::default())
//!     .with_limits(WorkflowLimits::default())
//!     .build()?;
//! ```
//!
//! ## Modules
//!
//! - [`agents`] - the five workflow nodes and their routing labels
//! - [`cli`] - argument parsing and terminal output for the binary
//! - [`llm`] - LLM clients, tool-use loop and decision oracle
//! - [`tools`] - capabilities (web search, Python execution)
//! - [`workflows`] - ledger, transition table and engine
//! - [`types`] - messages, tool types and errors
//! - [`utils`] - configuration loading

#![warn(rustdoc::missing_crate_level_docs)]

/// Workflow nodes.
pub mod agents;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Built-in capabilities.
pub mod tools;
/// Core types and error handling.
pub mod types;
/// Configuration.
pub mod utils;
/// Workflow engine.
pub mod workflows;

// Re-export commonly used types
pub use agents::{Agent, NodeOutput, Prompts};
pub use llm::{LLMClient, LLMResponse, LlmOracle, Oracle, Provider, RoutingDecision};
pub use tools::{Capability, CapabilityRegistry};
pub use types::{AppError, Author, Message, Result};
pub use utils::config::AgentflowConfig;
pub use workflows::{
    Ledger, NodeId, Transition, WorkflowEngine, WorkflowEvent, WorkflowLimits, WorkflowObserver,
    WorkflowResult,
};
