use crate::types::{AppError, Result, ToolDefinition};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// A black-box action an agent can take: string in, string out.
#[async_trait]
pub trait Capability: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// Description of the single `input` argument, shown to the model.
    fn input_description(&self) -> &str {
        "Input for the tool"
    }

    async fn invoke(&self, input: &str) -> Result<String>;
}

/// Named set of capabilities handed to one agent.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, capability: Arc<dyn Capability>) {
        self.capabilities
            .insert(capability.name().to_string(), capability);
    }

    pub fn with(mut self, capability: Arc<dyn Capability>) -> Self {
        self.register(capability);
        self
    }

    /// Tool definitions, sorted by name so prompts are deterministic.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .capabilities
            .values()
            .map(|c| ToolDefinition {
                name: c.name().to_string(),
                description: c.description().to_string(),
                parameters: input_schema(c.input_description()),
            })
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    pub async fn invoke(&self, name: &str, input: &str) -> Result<String> {
        match self.capabilities.get(name) {
            Some(capability) => capability.invoke(input).await,
            None => Err(AppError::CapabilityInvocation(format!(
                "Tool not found: {}",
                name
            ))),
        }
    }

    /// Sorted list of registered names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.capabilities.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("capabilities", &self.names())
            .finish()
    }
}

fn input_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "input": {
                "type": "string",
                "description": description
            }
        },
        "required": ["input"]
    })
}
