//! Capabilities agents can invoke during the tool-use loop.
//!
//! # Module Structure
//!
//! - [`registry`](crate::tools::registry) - the `Capability` trait and named sets of them
//! - [`search`](crate::tools::search) - `web_search` via DuckDuckGo
//! - [`python`](crate::tools::python) - `python_exec` in a subprocess
//!
//! ```ignore
//! let research = CapabilityRegistry::new().with(Arc::new(SearchTool::new(2)));
//! let text = research.invoke("web_search", "rust async runtimes").await?;
//! ```

/// Python code execution.
pub mod python;
/// Capability trait and registry.
pub mod registry;
/// Web search using DuckDuckGo.
pub mod search;

pub use python::PythonExecTool;
pub use registry::{Capability, CapabilityRegistry};
pub use search::SearchTool;
