//! Workflow Engine Module
//!
//! A run threads one [`Ledger`] through the node graph:
//!
//! ```text
//! supervisor -> {enhancer, researcher, coder}
//! enhancer   -> supervisor
//! researcher -> validator
//! coder      -> validator
//! validator  -> {supervisor, END}
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let engine = WorkflowEngine::from_config(&config)?;
//! let result = engine.run("What is 2+2?").await?;
//! println!("{} ({} steps)", result.final_answer, result.steps);
//! ```

pub mod engine;
pub mod graph;
pub mod ledger;
pub mod observer;

pub use engine::{
    WorkflowEngine, WorkflowEngineBuilder, WorkflowEvent, WorkflowLimits, WorkflowResult,
    WorkflowRun,
};
pub use graph::{NodeId, Transition, ENTRY_NODE};
pub use ledger::Ledger;
pub use observer::{ObservedEvent, RecordingObserver, TracingObserver, WorkflowObserver};
