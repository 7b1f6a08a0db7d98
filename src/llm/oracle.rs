//! Decision oracle: the one seam every workflow node reasons through.
//!
//! [`Oracle`] exposes the three kinds of call the nodes need: a routing
//! decision constrained to a label set, a free-text completion, and the
//! bounded tool-use loop. [`LlmOracle`] implements all three over any
//! [`LLMClient`].

use crate::llm::client::LLMClient;
use crate::llm::coordinator::{ConversationMessage, ToolCallingConfig, ToolCoordinator};
use crate::tools::registry::CapabilityRegistry;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Raw routing output: the chosen label and the model's reason for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub next: String,
    pub rationale: String,
}

impl RoutingDecision {
    pub fn new(next: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            next: next.into(),
            rationale: rationale.into(),
        }
    }
}

#[async_trait]
pub trait Oracle: Send + Sync {
    /// Pick one of `allowed`. The returned `next` is always spelled exactly as
    /// in `allowed`; anything else is an `OracleContractViolation`.
    async fn classify(
        &self,
        instruction: &str,
        conversation: &[ConversationMessage],
        allowed: &[&str],
    ) -> Result<RoutingDecision>;

    /// Free-text completion.
    async fn complete(
        &self,
        instruction: &str,
        conversation: &[ConversationMessage],
    ) -> Result<String>;

    /// Reason, call capabilities, observe, repeat. Returns the final text.
    async fn act_and_observe(
        &self,
        instruction: &str,
        conversation: &[ConversationMessage],
        capabilities: &CapabilityRegistry,
    ) -> Result<String>;
}

/// [`Oracle`] backed by a chat model.
pub struct LlmOracle {
    client: Arc<dyn LLMClient>,
    tool_config: ToolCallingConfig,
}

impl LlmOracle {
    pub fn new(client: Arc<dyn LLMClient>, tool_config: ToolCallingConfig) -> Self {
        Self {
            client,
            tool_config,
        }
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }
}

fn with_system(instruction: &str, conversation: &[ConversationMessage]) -> Vec<ConversationMessage> {
    let mut messages = Vec::with_capacity(conversation.len() + 1);
    messages.push(ConversationMessage::system(instruction));
    messages.extend_from_slice(conversation);
    messages
}

/// Output contract appended to the instruction of every `classify` call.
fn format_instructions(allowed: &[&str]) -> String {
    let labels: Vec<String> = allowed.iter().map(|l| format!("\"{}\"", l)).collect();
    format!(
        "Respond with a single JSON object and nothing else, in the form \
         {{\"next\": <one of {}>, \"reason\": \"<why you chose it>\"}}.",
        labels.join(", ")
    )
}

#[derive(Deserialize)]
struct RawDecision {
    next: String,
    #[serde(default, alias = "rationale")]
    reason: String,
}

/// Parse a model reply into a decision restricted to `allowed`.
///
/// Accepts surrounding prose and code fences: the object between the first
/// `{` and the last `}` is decoded. Labels match case-insensitively and are
/// returned in their canonical spelling.
pub fn parse_decision(raw: &str, allowed: &[&str]) -> Result<RoutingDecision> {
    let json = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => {
            return Err(AppError::OracleContractViolation(format!(
                "expected a JSON decision, got '{}'",
                raw.trim()
            )))
        }
    };

    let decision: RawDecision = serde_json::from_str(json).map_err(|e| {
        AppError::OracleContractViolation(format!("malformed decision '{}': {}", json, e))
    })?;

    let label = decision.next.trim();
    let canonical = allowed
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(label))
        .ok_or_else(|| {
            AppError::OracleContractViolation(format!(
                "label '{}' is not one of [{}]",
                label,
                allowed.join(", ")
            ))
        })?;

    Ok(RoutingDecision::new(*canonical, decision.reason.trim()))
}

#[async_trait]
impl Oracle for LlmOracle {
    async fn classify(
        &self,
        instruction: &str,
        conversation: &[ConversationMessage],
        allowed: &[&str],
    ) -> Result<RoutingDecision> {
        let instruction = format!("{}\n\n{}", instruction.trim_end(), format_instructions(allowed));
        let raw = self
            .client
            .generate_with_history(&with_system(&instruction, conversation))
            .await?;
        tracing::debug!(raw = %raw, "Routing reply");
        parse_decision(&raw, allowed)
    }

    async fn complete(
        &self,
        instruction: &str,
        conversation: &[ConversationMessage],
    ) -> Result<String> {
        self.client
            .generate_with_history(&with_system(instruction, conversation))
            .await
    }

    async fn act_and_observe(
        &self,
        instruction: &str,
        conversation: &[ConversationMessage],
        capabilities: &CapabilityRegistry,
    ) -> Result<String> {
        let coordinator = ToolCoordinator::new(self.client.clone(), self.tool_config.clone());
        let result = coordinator
            .execute(with_system(instruction, conversation), capabilities)
            .await?;
        tracing::debug!(
            iterations = result.iterations,
            tool_calls = result.tool_calls.len(),
            finish_reason = %result.finish_reason,
            "Tool loop finished"
        );
        Ok(result.content)
    }
}
