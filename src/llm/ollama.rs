use crate::llm::client::{check_status, http_client, LLMClient, LLMResponse, ModelParams};
use crate::llm::coordinator::{ConversationMessage, MessageRole};
use crate::types::{AppError, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Client for a local Ollama server's `/api/chat` endpoint.
pub struct OllamaClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    params: ModelParams,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String, params: ModelParams) -> Result<Self> {
        Ok(Self {
            http_client: http_client(&params)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            params,
        })
    }

    async fn chat(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        let mut body = json!({
            "model": self.model,
            "messages": messages.iter().map(to_wire_message).collect::<Vec<_>>(),
            "stream": false,
            "options": {
                "temperature": self.params.temperature
            }
        });
        if !tools.is_empty() {
            body["tools"] = tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters
                        }
                    })
                })
                .collect();
        }

        let url = format!("{}/api/chat", self.base_url);
        tracing::debug!(url = %url, model = %self.model, "Sending Ollama chat request");

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::OracleInvocation(format!("HTTP request failed: {}", e)))?;

        let json: Value = check_status("Ollama", response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::OracleInvocation(format!("Failed to parse response: {}", e)))?;

        parse_chat_response(&json)
    }
}

fn to_wire_message(msg: &ConversationMessage) -> Value {
    // Ollama has no participant names; prefix them into the content instead.
    let content = match &msg.name {
        Some(name) => format!("[{}] {}", name, msg.content),
        None => msg.content.clone(),
    };
    let mut wire = json!({
        "role": msg.role.as_str(),
        "content": content,
    });
    if msg.role == MessageRole::Assistant && !msg.tool_calls.is_empty() {
        wire["tool_calls"] = msg
            .tool_calls
            .iter()
            .map(|tc| {
                json!({
                    "function": {
                        "name": tc.name,
                        "arguments": tc.arguments
                    }
                })
            })
            .collect();
    }
    wire
}

/// Parse a non-streaming `/api/chat` response.
pub(crate) fn parse_chat_response(json: &Value) -> Result<LLMResponse> {
    let message = json
        .get("message")
        .ok_or_else(|| AppError::OracleInvocation("No message in response".to_string()))?;

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let mut tool_calls = Vec::new();
    let mut finish_reason = "stop".to_string();

    if let Some(tc_array) = message.get("tool_calls").and_then(|v| v.as_array()) {
        for tc in tc_array {
            if let Some(func) = tc.get("function") {
                let name = func
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string();
                let arguments = func.get("arguments").cloned().unwrap_or(json!({}));

                // Ollama does not assign call ids
                tool_calls.push(ToolCall {
                    id: uuid::Uuid::new_v4().to_string(),
                    name,
                    arguments,
                });
            }
        }
        if !tool_calls.is_empty() {
            finish_reason = "tool_calls".to_string();
        }
    }

    if tool_calls.is_empty() {
        if let Some(reason) = json.get("done_reason").and_then(|v| v.as_str()) {
            finish_reason = reason.to_string();
        }
    }

    Ok(LLMResponse {
        content,
        tool_calls,
        finish_reason,
    })
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate_with_history(&self, messages: &[ConversationMessage]) -> Result<String> {
        Ok(self.chat(messages, &[]).await?.content)
    }

    async fn generate_with_tools_and_history(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        self.chat(messages, tools).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
