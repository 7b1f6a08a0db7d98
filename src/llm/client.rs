//! LLM client abstraction and provider selection
//!
//! Two providers are supported, both over plain HTTP:
//! - **OpenAI-compatible**: any `/chat/completions` endpoint (Groq by default)
//! - **Ollama**: local inference through `/api/chat`

use crate::llm::coordinator::ConversationMessage;
use crate::types::{AppError, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use std::time::Duration;

/// Default OpenAI-compatible endpoint.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
/// Default model served by [`GROQ_API_BASE`].
pub const DEFAULT_OPENAI_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

/// Generic LLM client trait for provider abstraction
///
/// All providers implement this trait, so the oracle and the tool loop never
/// depend on a concrete backend.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a plain completion for a conversation.
    async fn generate_with_history(&self, messages: &[ConversationMessage]) -> Result<String>;

    /// Generate with tool definitions available to the model.
    async fn generate_with_tools_and_history(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Response from an LLM generation request
#[derive(Debug, Clone, PartialEq)]
pub struct LLMResponse {
    /// The text content of the response
    pub content: String,
    /// Any tool calls requested by the model
    pub tool_calls: Vec<ToolCall>,
    /// The reason generation stopped (e.g., "stop", "tool_calls", "length")
    pub finish_reason: String,
}

/// Sampling and transport settings shared by every provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI-compatible chat completions API (Groq, OpenAI, OpenRouter, ...)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: std::env::var("GROQ_API_KEY")?,
    ///     api_base: GROQ_API_BASE.to_string(),
    ///     model: DEFAULT_OPENAI_MODEL.to_string(),
    ///     params: ModelParams::default(),
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
        params: ModelParams,
    },

    /// Ollama local LLM provider
    ///
    /// Tool calling needs a model that supports it (`llama3.1`, `llama3.2`,
    /// `qwen2.5`, ...).
    Ollama {
        base_url: String,
        model: String,
        params: ModelParams,
    },
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the OpenAI-compatible provider has no
    /// API key, or if the HTTP client cannot be built.
    pub fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            Provider::OpenAI {
                api_key,
                api_base,
                model,
                params,
            } => {
                if api_key.trim().is_empty() {
                    return Err(AppError::Configuration(
                        "No API key for the OpenAI-compatible provider. \
                         Set GROQ_API_KEY or [llm].api_key"
                            .to_string(),
                    ));
                }
                Ok(Box::new(super::openai::OpenAIClient::new(
                    api_key.clone(),
                    api_base.clone(),
                    model.clone(),
                    params.clone(),
                )?))
            }

            Provider::Ollama {
                base_url,
                model,
                params,
            } => Ok(Box::new(super::ollama::OllamaClient::new(
                base_url.clone(),
                model.clone(),
                params.clone(),
            )?)),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}

/// Build the shared `reqwest` client for a provider.
pub(crate) fn http_client(params: &ModelParams) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(params.request_timeout)
        .build()
        .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Turn a non-success HTTP response into an oracle error carrying the body.
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    Err(AppError::OracleInvocation(format!(
        "{} request failed ({}): {}",
        provider, status, text
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        let openai = Provider::OpenAI {
            api_key: "".to_string(),
            api_base: "".to_string(),
            model: "m".to_string(),
            params: ModelParams::default(),
        };
        assert_eq!(openai.name(), "OpenAI");
        assert_eq!(openai.model(), "m");

        let ollama = Provider::Ollama {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            params: ModelParams::default(),
        };
        assert_eq!(ollama.name(), "Ollama");
    }

    #[test]
    fn test_openai_requires_api_key() {
        let provider = Provider::OpenAI {
            api_key: "  ".to_string(),
            api_base: GROQ_API_BASE.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            params: ModelParams::default(),
        };

        // Box<dyn LLMClient> is not Debug, so match instead of unwrap_err
        let err = match provider.create_client() {
            Ok(_) => panic!("Expected error"),
            Err(e) => e,
        };
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_create_clients() {
        let openai = Provider::OpenAI {
            api_key: "gsk_test".to_string(),
            api_base: GROQ_API_BASE.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            params: ModelParams::default(),
        };
        let client = openai.create_client().unwrap_or_else(|e| panic!("{}", e));
        assert_eq!(client.model_name(), DEFAULT_OPENAI_MODEL);

        let ollama = Provider::Ollama {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: "qwen2.5".to_string(),
            params: ModelParams::default(),
        };
        let client = ollama.create_client().unwrap_or_else(|e| panic!("{}", e));
        assert_eq!(client.model_name(), "qwen2.5");
    }
}
