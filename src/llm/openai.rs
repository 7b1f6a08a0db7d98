use crate::llm::client::{check_status, http_client, LLMClient, LLMResponse, ModelParams};
use crate::llm::coordinator::{ConversationMessage, MessageRole};
use crate::types::{AppError, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAIClient {
    http_client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    params: ModelParams,
}

impl OpenAIClient {
    pub fn new(
        api_key: String,
        api_base: String,
        model: String,
        params: ModelParams,
    ) -> Result<Self> {
        Ok(Self {
            http_client: http_client(&params)?,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
            params,
        })
    }

    async fn chat(&self, body: Value) -> Result<Value> {
        let url = format!("{}/chat/completions", self.api_base);
        tracing::debug!(url = %url, model = %self.model, "Sending chat completion request");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::OracleInvocation(format!("HTTP request failed: {}", e)))?;

        check_status("OpenAI-compatible", response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::OracleInvocation(format!("Failed to parse response: {}", e)))
    }

    fn request_body(&self, messages: &[ConversationMessage], tools: &[ToolDefinition]) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": messages.iter().map(to_wire_message).collect::<Vec<_>>(),
            "temperature": self.params.temperature,
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
            body["tool_choice"] = json!("auto");
        }
        body
    }
}

fn to_wire_message(msg: &ConversationMessage) -> Value {
    let mut wire = json!({
        "role": msg.role.as_str(),
        "content": msg.content,
    });
    if let Some(name) = &msg.name {
        wire["name"] = json!(name);
    }
    match msg.role {
        MessageRole::Assistant if !msg.tool_calls.is_empty() => {
            wire["tool_calls"] = msg
                .tool_calls
                .iter()
                .map(|tc| {
                    json!({
                        "id": tc.id,
                        "type": "function",
                        "function": {
                            "name": tc.name,
                            // the wire format wants arguments as a JSON string
                            "arguments": tc.arguments.to_string()
                        }
                    })
                })
                .collect();
        }
        MessageRole::Tool => {
            wire["tool_call_id"] = json!(msg.tool_call_id.clone().unwrap_or_default());
        }
        _ => {}
    }
    wire
}

/// Parse `choices[0]` of a chat completion response.
pub(crate) fn parse_completion(response: &Value) -> Result<LLMResponse> {
    let choice = response
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| AppError::OracleInvocation("No choices in response".to_string()))?;
    let message = choice
        .get("message")
        .ok_or_else(|| AppError::OracleInvocation("No message in response".to_string()))?;

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let tool_calls = message
        .get("tool_calls")
        .and_then(|v| v.as_array())
        .map(|calls| {
            calls
                .iter()
                .filter_map(|call| {
                    let func = call.get("function")?;
                    let name = func.get("name")?.as_str()?.to_string();
                    let arguments = match func.get("arguments") {
                        Some(Value::String(raw)) => serde_json::from_str(raw)
                            .unwrap_or_else(|_| Value::String(raw.clone())),
                        Some(other) => other.clone(),
                        None => json!({}),
                    };
                    let id = call
                        .get("id")
                        .and_then(|v| v.as_str())
                        .map(str::to_string)
                        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                    Some(ToolCall {
                        id,
                        name,
                        arguments,
                    })
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let finish_reason = choice
        .get("finish_reason")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    Ok(LLMResponse {
        content,
        tool_calls,
        finish_reason,
    })
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate_with_history(&self, messages: &[ConversationMessage]) -> Result<String> {
        let response = self.chat(self.request_body(messages, &[])).await?;
        Ok(parse_completion(&response)?.content)
    }

    async fn generate_with_tools_and_history(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        let response = self.chat(self.request_body(messages, tools)).await?;
        parse_completion(&response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
