use crate::agents::{Agent, NodeOutput};
use crate::llm::oracle::Oracle;
use crate::types::Result;
use crate::workflows::graph::{NodeId, Transition};
use crate::workflows::ledger::Ledger;
use async_trait::async_trait;
use std::sync::Arc;

/// Rewrites the request into a sharper one, then hands control back to the
/// supervisor without a validation round.
pub struct EnhancerAgent {
    oracle: Arc<dyn Oracle>,
    prompt: String,
}

impl EnhancerAgent {
    pub fn new(oracle: Arc<dyn Oracle>, prompt: impl Into<String>) -> Self {
        Self {
            oracle,
            prompt: prompt.into(),
        }
    }
}

#[async_trait]
impl Agent for EnhancerAgent {
    async fn handle(&self, ledger: &Ledger) -> Result<NodeOutput> {
        let refined = self
            .oracle
            .complete(&self.prompt, &ledger.to_conversation())
            .await?;

        Ok(NodeOutput::new(
            refined,
            Transition::Goto(NodeId::Supervisor),
        ))
    }

    fn system_prompt(&self) -> &str {
        &self.prompt
    }

    fn node_id(&self) -> NodeId {
        NodeId::Enhancer
    }
}
