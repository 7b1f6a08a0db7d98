//! Workflow nodes.
//!
//! Every node reads the ledger and returns exactly one contribution plus the
//! transition to follow. The engine, not the node, appends the contribution.

pub mod coder;
pub mod enhancer;
pub mod prompts;
pub mod researcher;
pub mod router;
pub mod supervisor;
pub mod validator;

use crate::types::Result;
use crate::workflows::graph::{NodeId, Transition};
use crate::workflows::ledger::Ledger;
use async_trait::async_trait;

pub use coder::CoderAgent;
pub use enhancer::EnhancerAgent;
pub use prompts::Prompts;
pub use researcher::ResearcherAgent;
pub use router::{Decision, RouteLabel, SupervisorRoute, ValidatorVerdict};
pub use supervisor::SupervisorAgent;
pub use validator::ValidatorAgent;

/// A node's single contribution to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOutput {
    pub content: String,
    pub next: Transition,
}

impl NodeOutput {
    pub fn new(content: impl Into<String>, next: Transition) -> Self {
        Self {
            content: content.into(),
            next,
        }
    }
}

/// Base trait for all workflow nodes
#[async_trait]
pub trait Agent: Send + Sync {
    /// Run the node against a read-only view of the ledger.
    async fn handle(&self, ledger: &Ledger) -> Result<NodeOutput>;

    /// Get the node's instruction text
    fn system_prompt(&self) -> &str;

    /// The graph node this agent implements
    fn node_id(&self) -> NodeId;
}
