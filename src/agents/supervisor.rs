use crate::agents::router::{decide, RouteLabel, SupervisorRoute};
use crate::agents::{Agent, NodeOutput};
use crate::llm::oracle::Oracle;
use crate::types::Result;
use crate::workflows::graph::NodeId;
use crate::workflows::ledger::Ledger;
use async_trait::async_trait;
use std::sync::Arc;

/// Chooses which worker acts next. Its rationale is what lands in the ledger.
pub struct SupervisorAgent {
    oracle: Arc<dyn Oracle>,
    prompt: String,
}

impl SupervisorAgent {
    pub fn new(oracle: Arc<dyn Oracle>, prompt: impl Into<String>) -> Self {
        Self {
            oracle,
            prompt: prompt.into(),
        }
    }
}

#[async_trait]
impl Agent for SupervisorAgent {
    async fn handle(&self, ledger: &Ledger) -> Result<NodeOutput> {
        let decision = decide::<SupervisorRoute>(
            self.oracle.as_ref(),
            NodeId::Supervisor,
            &self.prompt,
            &ledger.to_conversation(),
        )
        .await?;

        Ok(NodeOutput::new(
            decision.rationale,
            decision.route.transition(),
        ))
    }

    fn system_prompt(&self) -> &str {
        &self.prompt
    }

    fn node_id(&self) -> NodeId {
        NodeId::Supervisor
    }
}
