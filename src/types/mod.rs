use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============= Ledger Types =============

/// Who produced a ledger entry.
///
/// `User` is reserved for the original request; every other variant names
/// the workflow node that contributed the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Supervisor,
    Enhancer,
    Researcher,
    Coder,
    Validator,
}

impl Author {
    /// Lowercase label used in logs and in the `name` field sent to the LLM.
    pub fn as_str(&self) -> &'static str {
        match self {
            Author::User => "user",
            Author::Supervisor => "supervisor",
            Author::Enhancer => "enhancer",
            Author::Researcher => "researcher",
            Author::Coder => "coder",
            Author::Validator => "validator",
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub author: Author,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(author: Author, content: impl Into<String>) -> Self {
        Self {
            author,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// The original request that opens every ledger.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Author::User, content)
    }
}

// ============= Tool Types =============

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// The string argument handed to a capability.
    ///
    /// Capabilities take a single string. Models usually send
    /// `{"input": "..."}`, but a bare string or some other object shape is
    /// accepted too and passed through as JSON text.
    pub fn input(&self) -> String {
        match &self.arguments {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Object(map) => match map.get("input") {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => self.arguments.to_string(),
            },
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Oracle invocation failed: {0}")]
    OracleInvocation(String),

    #[error("Oracle contract violation: {0}")]
    OracleContractViolation(String),

    #[error("Capability invocation failed: {0}")]
    CapabilityInvocation(String),

    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Workflow budget exceeded after {steps} steps ({elapsed_ms} ms)")]
    BudgetExceeded { steps: usize, elapsed_ms: u64 },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
