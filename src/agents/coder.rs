use crate::agents::{Agent, NodeOutput};
use crate::llm::oracle::Oracle;
use crate::tools::registry::CapabilityRegistry;
use crate::types::Result;
use crate::workflows::graph::{NodeId, Transition};
use crate::workflows::ledger::Ledger;
use async_trait::async_trait;
use std::sync::Arc;

/// Solves technical tasks, running code through its capabilities.
pub struct CoderAgent {
    oracle: Arc<dyn Oracle>,
    capabilities: Arc<CapabilityRegistry>,
    prompt: String,
}

impl CoderAgent {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        capabilities: Arc<CapabilityRegistry>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            oracle,
            capabilities,
            prompt: prompt.into(),
        }
    }
}

#[async_trait]
impl Agent for CoderAgent {
    async fn handle(&self, ledger: &Ledger) -> Result<NodeOutput> {
        let answer = self
            .oracle
            .act_and_observe(&self.prompt, &ledger.to_conversation(), &self.capabilities)
            .await?;

        Ok(NodeOutput::new(answer, Transition::Goto(NodeId::Validator)))
    }

    fn system_prompt(&self) -> &str {
        &self.prompt
    }

    fn node_id(&self) -> NodeId {
        NodeId::Coder
    }
}
