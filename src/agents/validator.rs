use crate::agents::router::{decide, RouteLabel, ValidatorVerdict};
use crate::agents::{Agent, NodeOutput};
use crate::llm::coordinator::ConversationMessage;
use crate::llm::oracle::Oracle;
use crate::types::Result;
use crate::workflows::graph::NodeId;
use crate::workflows::ledger::Ledger;
use async_trait::async_trait;
use std::sync::Arc;

/// The only node that can end a run.
///
/// It judges the latest contribution against the original question and sees
/// nothing in between.
pub struct ValidatorAgent {
    oracle: Arc<dyn Oracle>,
    prompt: String,
}

impl ValidatorAgent {
    pub fn new(oracle: Arc<dyn Oracle>, prompt: impl Into<String>) -> Self {
        Self {
            oracle,
            prompt: prompt.into(),
        }
    }
}

/// `[user: question, assistant: latest answer]`.
pub fn review_conversation(ledger: &Ledger) -> Vec<ConversationMessage> {
    vec![
        ConversationMessage::user(&ledger.question().content),
        ConversationMessage::assistant(&ledger.last().content, Vec::new()),
    ]
}

#[async_trait]
impl Agent for ValidatorAgent {
    async fn handle(&self, ledger: &Ledger) -> Result<NodeOutput> {
        let decision = decide::<ValidatorVerdict>(
            self.oracle.as_ref(),
            NodeId::Validator,
            &self.prompt,
            &review_conversation(ledger),
        )
        .await?;

        if decision.route == ValidatorVerdict::Finish {
            tracing::info!("Validator accepted the answer");
        }
        Ok(NodeOutput::new(
            decision.rationale,
            decision.route.transition(),
        ))
    }

    fn system_prompt(&self) -> &str {
        &self.prompt
    }

    fn node_id(&self) -> NodeId {
        NodeId::Validator
    }
}
