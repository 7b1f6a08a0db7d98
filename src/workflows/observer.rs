//! Injected observability for workflow runs.
//!
//! The engine never logs through global state of its own; it reports to a
//! [`WorkflowObserver`] handed to it at build time.

use crate::types::{AppError, Message};
use crate::workflows::graph::{NodeId, Transition};
use parking_lot::Mutex;

/// Receives lifecycle callbacks from the engine. All methods default to no-ops.
pub trait WorkflowObserver: Send + Sync {
    fn on_start(&self, _query: &str) {}

    /// A node ran and its message was appended.
    fn on_transition(&self, _from: NodeId, _to: Transition, _message: &Message) {}

    fn on_finish(&self, _steps: usize, _final_answer: &str) {}

    /// A run aborted. `node` is `None` when the failure happened at a node
    /// boundary (budget) rather than inside a handler.
    fn on_error(&self, _node: Option<NodeId>, _error: &AppError) {}
}

/// Default observer: structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl WorkflowObserver for TracingObserver {
    fn on_start(&self, query: &str) {
        tracing::info!(query = %query, "Starting workflow");
    }

    fn on_transition(&self, from: NodeId, to: Transition, message: &Message) {
        tracing::info!("Current Node: {} -> Goto: {}", from, to);
        tracing::debug!(node = %from, content = %message.content, "Node output");
    }

    fn on_finish(&self, steps: usize, _final_answer: &str) {
        tracing::info!(steps, "Workflow finished");
    }

    fn on_error(&self, node: Option<NodeId>, error: &AppError) {
        match node {
            Some(node) => tracing::error!(node = %node, "Workflow aborted: {}", error),
            None => tracing::error!("Workflow aborted: {}", error),
        }
    }
}

/// One callback captured by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    Started(String),
    Transition { from: NodeId, to: Transition },
    Finished { steps: usize, final_answer: String },
    Failed { node: Option<NodeId>, error: String },
}

/// Observer that keeps every callback in memory, for tests and embedding.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().clone()
    }

    /// Just the transitions, in order.
    pub fn transitions(&self) -> Vec<(NodeId, Transition)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ObservedEvent::Transition { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

impl WorkflowObserver for RecordingObserver {
    fn on_start(&self, query: &str) {
        self.events
            .lock()
            .push(ObservedEvent::Started(query.to_string()));
    }

    fn on_transition(&self, from: NodeId, to: Transition, _message: &Message) {
        self.events
            .lock()
            .push(ObservedEvent::Transition { from, to });
    }

    fn on_finish(&self, steps: usize, final_answer: &str) {
        self.events.lock().push(ObservedEvent::Finished {
            steps,
            final_answer: final_answer.to_string(),
        });
    }

    fn on_error(&self, node: Option<NodeId>, error: &AppError) {
        self.events.lock().push(ObservedEvent::Failed {
            node,
            error: error.to_string(),
        });
    }
}
