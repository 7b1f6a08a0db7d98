//! `agentflow.toml` configuration.
//!
//! Lookup order: the explicit `--config` path, then `./agentflow.toml`, then
//! built-in defaults. Environment variables are applied on top of whatever
//! was loaded.

use crate::agents::prompts::Prompts;
use crate::llm::client::{
    ModelParams, Provider, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL, DEFAULT_OPENAI_MODEL,
    GROQ_API_BASE,
};
use crate::llm::coordinator::ToolCallingConfig;
use crate::tools::python::DEFAULT_PYTHON_BIN;
use crate::tools::search::DEFAULT_MAX_RESULTS;
use crate::types::{AppError, Result};
use crate::workflows::engine::{WorkflowLimits, DEFAULT_MAX_STEPS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "agentflow.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentflowConfig {
    pub llm: LlmConfig,
    pub workflow: WorkflowConfig,
    pub tools: ToolsConfig,
    pub prompts: Prompts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Any OpenAI-compatible endpoint; Groq unless `api_base` says otherwise.
    #[default]
    OpenAI,
    Ollama,
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "groq" => Ok(ProviderKind::OpenAI),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(AppError::Configuration(format!(
                "Unknown provider '{}' (expected 'openai' or 'ollama')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    /// Defaults per provider when unset.
    pub model: Option<String>,
    /// Endpoint base URL. For Ollama this is the server URL.
    pub api_base: Option<String>,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    /// `OLLAMA_URL` from the environment; wins over `api_base` for Ollama.
    #[serde(skip)]
    pub ollama_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            api_base: None,
            api_key: None,
            temperature: 0.0,
            request_timeout_secs: 120,
            ollama_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Node visits per run. 0 disables the bound.
    pub max_steps: usize,
    /// Wall-clock seconds per run. 0 disables the bound.
    pub max_duration_secs: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_duration_secs: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub search_max_results: usize,
    pub python_bin: String,
    pub code_timeout_secs: u64,
    /// LLM round-trips per tool-use loop.
    pub max_iterations: usize,
    pub parallel_execution: bool,
    pub tool_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            search_max_results: DEFAULT_MAX_RESULTS,
            python_bin: DEFAULT_PYTHON_BIN.to_string(),
            code_timeout_secs: 30,
            max_iterations: 10,
            parallel_execution: true,
            tool_timeout_secs: 30,
        }
    }
}

impl AgentflowConfig {
    /// Load configuration and apply environment overrides.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_path(path)? {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>> {
        match path {
            Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
            Some(path) => Err(AppError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            ))),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                Ok(default.exists().then_some(default))
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            AppError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// Recognized: `GROQ_API_KEY` (or lowercase `groq_api_key`),
    /// `AGENTFLOW_PROVIDER`, `AGENTFLOW_MODEL`, `OLLAMA_URL`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = get("AGENTFLOW_PROVIDER") {
            self.llm.provider = provider.parse()?;
        }
        if let Some(model) = get("AGENTFLOW_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(key) = get("GROQ_API_KEY").or_else(|| get("groq_api_key")) {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = get("OLLAMA_URL") {
            self.llm.ollama_url = Some(url);
        }
        Ok(())
    }

    /// Concrete provider with every default filled in.
    pub fn provider(&self) -> Provider {
        let params = ModelParams {
            temperature: self.llm.temperature,
            request_timeout: Duration::from_secs(self.llm.request_timeout_secs.max(1)),
        };
        match self.llm.provider {
            ProviderKind::OpenAI => Provider::OpenAI {
                api_key: self.llm.api_key.clone().unwrap_or_default(),
                api_base: self
                    .llm
                    .api_base
                    .clone()
                    .unwrap_or_else(|| GROQ_API_BASE.to_string()),
                model: self
                    .llm
                    .model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                params,
            },
            ProviderKind::Ollama => Provider::Ollama {
                base_url: self
                    .llm
                    .ollama_url
                    .clone()
                    .or_else(|| self.llm.api_base.clone())
                    .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
                model: self
                    .llm
                    .model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
                params,
            },
        }
    }

    pub fn tool_calling(&self) -> ToolCallingConfig {
        ToolCallingConfig {
            max_iterations: self.tools.max_iterations.max(1),
            parallel_execution: self.tools.parallel_execution,
            tool_timeout: Duration::from_secs(self.tools.tool_timeout_secs.max(1)),
        }
    }

    pub fn limits(&self) -> WorkflowLimits {
        WorkflowLimits {
            max_steps: (self.workflow.max_steps > 0).then_some(self.workflow.max_steps),
            max_duration: (self.workflow.max_duration_secs > 0)
                .then(|| Duration::from_secs(self.workflow.max_duration_secs)),
        }
    }
}
