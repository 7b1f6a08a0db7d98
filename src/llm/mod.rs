//! LLM clients, the reasoning-and-acting loop, and the decision oracle.
//!
//! # Architecture
//!
//! - [`LLMClient`] - the trait every provider implements
//! - [`Provider`] - runtime provider selection, builds boxed clients
//! - [`ToolCoordinator`] - bounded tool-use loop over any client
//! - [`Oracle`] / [`LlmOracle`] - what workflow nodes actually call
//!
//! # Example
//!
//! ```ignore
//! use agentflow::llm::{LlmOracle, Provider, ToolCallingConfig};
//! use std::sync::Arc;
//!
//! let client: Arc<dyn LLMClient> = Arc::from(provider.create_client()?);
//! let oracle = LlmOracle::new(client, ToolCallingConfig::default());
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
/// Multi-turn tool calling.
pub mod coordinator;
pub mod ollama;
pub mod openai;
/// Routing, completion and tool-use calls used by workflow nodes.
pub mod oracle;

pub use client::{LLMClient, LLMResponse, ModelParams, Provider};
pub use coordinator::{
    ConversationMessage, CoordinatorResult, FinishReason, MessageRole, ToolCallingConfig,
    ToolCoordinator,
};
pub use oracle::{LlmOracle, Oracle, RoutingDecision};
