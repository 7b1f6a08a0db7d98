//! Reasoning-and-acting loop over any `LLMClient`.
//!
//! The coordinator alternates between asking the model what to do and running
//! the capabilities it asked for:
//!
//! 1. Reasoning: send the conversation plus capability definitions
//! 2. No tool calls in the reply: the loop is answered
//! 3. Tool calls: run each capability (with a timeout) and feed the output back
//! 4. Repeat until answered or `max_iterations` round-trips were spent
//!
//! Capability failures never abort the loop. They are handed back to the model
//! as observation text so it can try something else. Only a failing LLM call
//! is fatal.
//!
//! # Example
//!
//! ```rust,ignore
//! use agentflow::llm::coordinator::{ConversationMessage, ToolCallingConfig, ToolCoordinator};
//!
//! let coordinator = ToolCoordinator::new(client, ToolCallingConfig::default());
//! let result = coordinator
//!     .execute(vec![ConversationMessage::user("What's 2 + 2?")], &registry)
//!     .await?;
//! println!("{} ({} tool calls)", result.content, result.tool_calls.len());
//! ```

use crate::llm::client::LLMClient;
use crate::tools::registry::CapabilityRegistry;
use crate::types::{AppError, Result, ToolCall};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Loop bounds and tool execution behavior.
#[derive(Debug, Clone)]
pub struct ToolCallingConfig {
    /// Maximum number of LLM round-trips (not tool calls).
    pub max_iterations: usize,

    /// Run the tool calls of one reply concurrently.
    pub parallel_execution: bool,

    /// Timeout for a single capability invocation.
    pub tool_timeout: Duration,
}

impl Default for ToolCallingConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            parallel_execution: true,
            tool_timeout: Duration::from_secs(30),
        }
    }
}

/// One executed capability call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Identifier assigned by the model.
    pub id: String,
    pub name: String,
    pub input: String,
    /// Text handed back to the model; error text when `success` is false.
    pub observation: String,
    pub success: bool,
    pub duration_ms: u64,
}

/// Why a coordination session ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FinishReason {
    /// Model answered without requesting tools.
    Stop,
    /// Iteration budget spent.
    MaxIterations,
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::Stop => write!(f, "stop"),
            FinishReason::MaxIterations => write!(f, "max_iterations"),
        }
    }
}

/// A message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    /// Participant name, used to tell workflow nodes apart in user turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tool calls requested by the assistant (only for Assistant role).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Call this message answers (only for Tool role).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

impl ConversationMessage {
    fn plain(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::User, content)
    }

    /// User turn attributed to a named participant.
    pub fn named_user(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::plain(MessageRole::User, content)
        }
    }

    /// Assistant turn with optional tool calls.
    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::plain(MessageRole::Assistant, content)
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, observation: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::plain(MessageRole::Tool, observation)
        }
    }
}

/// Result of a complete coordination session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorResult {
    /// Final text from the model.
    pub content: String,
    pub tool_calls: Vec<ToolCallRecord>,
    /// LLM round-trips performed.
    pub iterations: usize,
    pub finish_reason: FinishReason,
    /// Full conversation, including tool observations.
    pub message_history: Vec<ConversationMessage>,
}

/// States of the loop. `Acting` carries the calls of the latest reply.
enum LoopState {
    Reasoning,
    Acting(Vec<ToolCall>),
    Answered(String),
}

/// Drives the reasoning-and-acting loop for one client.
pub struct ToolCoordinator {
    client: Arc<dyn LLMClient>,
    config: ToolCallingConfig,
}

impl ToolCoordinator {
    pub fn new(client: Arc<dyn LLMClient>, config: ToolCallingConfig) -> Self {
        Self { client, config }
    }

    pub fn with_defaults(client: Arc<dyn LLMClient>) -> Self {
        Self::new(client, ToolCallingConfig::default())
    }

    /// Run the loop starting from `messages` with the given capability set.
    pub async fn execute(
        &self,
        mut messages: Vec<ConversationMessage>,
        registry: &CapabilityRegistry,
    ) -> Result<CoordinatorResult> {
        let tools = registry.definitions();
        let mut records: Vec<ToolCallRecord> = Vec::new();
        let mut iterations = 0;
        let mut last_text = String::new();
        let mut state = LoopState::Reasoning;

        loop {
            state = match state {
                LoopState::Reasoning if iterations >= self.config.max_iterations => {
                    tracing::warn!(
                        iterations,
                        "Tool loop hit its iteration budget without a final answer"
                    );
                    let content = if last_text.trim().is_empty() {
                        format!(
                            "Stopped after {} reasoning steps without reaching a final answer.",
                            iterations
                        )
                    } else {
                        last_text
                    };
                    return Ok(CoordinatorResult {
                        content,
                        tool_calls: records,
                        iterations,
                        finish_reason: FinishReason::MaxIterations,
                        message_history: messages,
                    });
                }
                LoopState::Reasoning => {
                    iterations += 1;
                    let response = self
                        .client
                        .generate_with_tools_and_history(&messages, &tools)
                        .await?;
                    tracing::debug!(
                        iteration = iterations,
                        tool_calls = response.tool_calls.len(),
                        finish_reason = %response.finish_reason,
                        "LLM replied"
                    );

                    messages.push(ConversationMessage::assistant(
                        &response.content,
                        response.tool_calls.clone(),
                    ));
                    if !response.content.trim().is_empty() {
                        last_text = response.content.clone();
                    }

                    if response.tool_calls.is_empty() {
                        LoopState::Answered(response.content)
                    } else {
                        LoopState::Acting(response.tool_calls)
                    }
                }
                LoopState::Acting(calls) => {
                    for record in self.execute_tool_calls(&calls, registry).await {
                        messages.push(ConversationMessage::tool_result(
                            &record.id,
                            &record.observation,
                        ));
                        records.push(record);
                    }
                    LoopState::Reasoning
                }
                LoopState::Answered(content) => {
                    return Ok(CoordinatorResult {
                        content,
                        tool_calls: records,
                        iterations,
                        finish_reason: FinishReason::Stop,
                        message_history: messages,
                    });
                }
            };
        }
    }

    async fn execute_tool_calls(
        &self,
        calls: &[ToolCall],
        registry: &CapabilityRegistry,
    ) -> Vec<ToolCallRecord> {
        if self.config.parallel_execution {
            join_all(calls.iter().map(|call| self.execute_single_tool(call, registry))).await
        } else {
            let mut records = Vec::with_capacity(calls.len());
            for call in calls {
                records.push(self.execute_single_tool(call, registry).await);
            }
            records
        }
    }

    /// Run one call under the tool timeout. Never fails: errors become the
    /// observation text.
    async fn execute_single_tool(
        &self,
        call: &ToolCall,
        registry: &CapabilityRegistry,
    ) -> ToolCallRecord {
        let start = Instant::now();
        let input = call.input();

        let outcome = if registry.has_capability(&call.name) {
            match timeout(self.config.tool_timeout, registry.invoke(&call.name, &input)).await {
                Ok(result) => result,
                Err(_) => Err(AppError::CapabilityInvocation(format!(
                    "'{}' timed out after {}s",
                    call.name,
                    self.config.tool_timeout.as_secs()
                ))),
            }
        } else {
            Err(AppError::CapabilityInvocation(format!(
                "Unknown tool '{}'. Available tools: {}",
                call.name,
                registry.names().join(", ")
            )))
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let (observation, success) = match outcome {
            Ok(output) => (output, true),
            Err(e) => {
                tracing::warn!(tool = %call.name, "Capability failed: {}", e);
                (format!("Error: {}", e), false)
            }
        };

        ToolCallRecord {
            id: call.id.clone(),
            name: call.name.clone(),
            input,
            observation,
            success,
            duration_ms,
        }
    }

    pub fn client(&self) -> &Arc<dyn LLMClient> {
        &self.client
    }

    pub fn config(&self) -> &ToolCallingConfig {
        &self.config
    }
}
