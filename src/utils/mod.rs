/// File and environment configuration.
pub mod config;

pub use config::{AgentflowConfig, ProviderKind};
