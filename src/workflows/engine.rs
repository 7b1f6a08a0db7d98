//! Workflow Engine
//!
//! Drives a run through the supervisor / worker / validator graph: invokes
//! the current node with a read-only ledger, appends its single contribution,
//! follows the returned transition, and stops when the validator ends the run.

use crate::agents::{
    Agent, CoderAgent, EnhancerAgent, Prompts, ResearcherAgent, SupervisorAgent, ValidatorAgent,
};
use crate::llm::oracle::{LlmOracle, Oracle};
use crate::tools::{CapabilityRegistry, PythonExecTool, SearchTool};
use crate::types::{AppError, Message, Result};
use crate::utils::config::AgentflowConfig;
use crate::workflows::graph::{NodeId, Transition, ENTRY_NODE};
use crate::workflows::ledger::Ledger;
use crate::workflows::observer::{TracingObserver, WorkflowObserver};
use futures::Stream;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default cap on node visits per run.
pub const DEFAULT_MAX_STEPS: usize = 25;

/// Bounds enforced at every node boundary. `None` disables a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowLimits {
    pub max_steps: Option<usize>,
    pub max_duration: Option<Duration>,
}

impl Default for WorkflowLimits {
    fn default() -> Self {
        Self {
            max_steps: Some(DEFAULT_MAX_STEPS),
            max_duration: None,
        }
    }
}

impl WorkflowLimits {
    pub fn unbounded() -> Self {
        Self {
            max_steps: None,
            max_duration: None,
        }
    }
}

/// Emitted after every node execution in streaming mode.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowEvent {
    pub node: NodeId,
    pub message: Message,
    pub next: Transition,
    /// Ledger length after the append.
    pub ledger_len: usize,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub ledger: Ledger,
    /// Content of the message the terminating validator judged.
    pub final_answer: String,
    /// Number of node visits.
    pub steps: usize,
}

/// Owns the node registry and executes runs against it.
///
/// The engine holds no per-run state, so one instance can serve any number
/// of concurrent runs.
pub struct WorkflowEngine {
    nodes: HashMap<NodeId, Arc<dyn Agent>>,
    limits: WorkflowLimits,
    observer: Arc<dyn WorkflowObserver>,
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("limits", &self.limits)
            .finish()
    }
}

impl WorkflowEngine {
    pub fn builder() -> WorkflowEngineBuilder {
        WorkflowEngineBuilder::new()
    }

    /// Builder pre-populated with the five standard nodes.
    pub fn from_oracle(
        oracle: Arc<dyn Oracle>,
        research_capabilities: Arc<CapabilityRegistry>,
        coding_capabilities: Arc<CapabilityRegistry>,
        prompts: &Prompts,
    ) -> WorkflowEngineBuilder {
        Self::builder()
            .with_node(Arc::new(SupervisorAgent::new(
                oracle.clone(),
                prompts.supervisor.clone(),
            )))
            .with_node(Arc::new(EnhancerAgent::new(
                oracle.clone(),
                prompts.enhancer.clone(),
            )))
            .with_node(Arc::new(ResearcherAgent::new(
                oracle.clone(),
                research_capabilities,
                prompts.researcher.clone(),
            )))
            .with_node(Arc::new(CoderAgent::new(
                oracle.clone(),
                coding_capabilities,
                prompts.coder.clone(),
            )))
            .with_node(Arc::new(ValidatorAgent::new(
                oracle,
                prompts.validator.clone(),
            )))
    }

    /// Fully wired engine: configured provider, built-in capabilities,
    /// configured prompts and limits.
    pub fn from_config(config: &AgentflowConfig) -> Result<Self> {
        let provider = config.provider();
        let client = provider.create_client()?;
        tracing::info!(
            provider = provider.name(),
            model = client.model_name(),
            "Using LLM provider"
        );
        let oracle = Arc::new(LlmOracle::new(Arc::from(client), config.tool_calling()));

        let research = CapabilityRegistry::new()
            .with(Arc::new(SearchTool::new(config.tools.search_max_results)));
        let coding = CapabilityRegistry::new().with(Arc::new(PythonExecTool::new(
            config.tools.python_bin.clone(),
            Duration::from_secs(config.tools.code_timeout_secs.max(1)),
        )));

        Self::from_oracle(oracle, Arc::new(research), Arc::new(coding), &config.prompts)
            .with_limits(config.limits())
            .build()
    }

    pub fn limits(&self) -> WorkflowLimits {
        self.limits
    }

    /// Open a run cursor. Fails with [`AppError::EmptyQuery`] before any
    /// ledger exists if the query is blank.
    pub fn start(&self, query: &str) -> Result<WorkflowRun<'_>> {
        let ledger = Ledger::new(query)?;
        self.observer.on_start(query);
        Ok(WorkflowRun {
            engine: self,
            ledger,
            current: Some(ENTRY_NODE),
            steps: 0,
            started: Instant::now(),
        })
    }

    /// Execute a run to completion.
    pub async fn run(&self, query: &str) -> Result<WorkflowResult> {
        let mut run = self.start(query)?;
        while run.step().await?.is_some() {}
        run.into_result()
    }

    /// Execute a run lazily, yielding one event per node execution.
    ///
    /// The next node only runs when the stream is polled again, so dropping
    /// the stream between events abandons the run cleanly.
    pub fn stream<'a>(
        &'a self,
        query: &str,
    ) -> impl Stream<Item = Result<WorkflowEvent>> + Send + 'a {
        let query = query.to_string();
        async_stream::try_stream! {
            let mut run = self.start(&query)?;
            while let Some(event) = run.step().await? {
                yield event;
            }
        }
    }

    fn node(&self, id: NodeId) -> Result<&Arc<dyn Agent>> {
        self.nodes
            .get(&id)
            .ok_or_else(|| AppError::Internal(format!("No handler registered for '{}'", id)))
    }
}

/// Cursor over a single run. Owns the run's ledger.
pub struct WorkflowRun<'a> {
    engine: &'a WorkflowEngine,
    ledger: Ledger,
    current: Option<NodeId>,
    steps: usize,
    started: Instant,
}

impl<'a> WorkflowRun<'a> {
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Node that will run on the next `step`, or `None` once finished.
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none()
    }

    /// Run the current node once. Returns `Ok(None)` when the run has ended.
    ///
    /// On error the ledger is exactly as it was before the call.
    pub async fn step(&mut self) -> Result<Option<WorkflowEvent>> {
        let Some(node_id) = self.current else {
            return Ok(None);
        };

        if let Err(e) = self.check_budget() {
            self.engine.observer.on_error(None, &e);
            return Err(e);
        }

        let node = self.engine.node(node_id)?;
        let output = match node.handle(&self.ledger).await {
            Ok(output) => output,
            Err(e) => {
                self.engine.observer.on_error(Some(node_id), &e);
                return Err(e);
            }
        };

        if !node_id.allows(output.next) {
            let e = AppError::InvalidTransition {
                from: node_id.to_string(),
                to: output.next.to_string(),
            };
            self.engine.observer.on_error(Some(node_id), &e);
            return Err(e);
        }

        let message = self
            .ledger
            .append(Message::new(node_id.author(), output.content))
            .clone();
        self.steps += 1;
        self.engine
            .observer
            .on_transition(node_id, output.next, &message);

        self.current = match output.next {
            Transition::Goto(next) => Some(next),
            Transition::End => {
                self.engine
                    .observer
                    .on_finish(self.steps, final_answer(&self.ledger));
                None
            }
        };

        Ok(Some(WorkflowEvent {
            node: node_id,
            message,
            next: output.next,
            ledger_len: self.ledger.len(),
        }))
    }

    /// Consume a finished run.
    pub fn into_result(self) -> Result<WorkflowResult> {
        if !self.is_finished() {
            return Err(AppError::Internal(
                "Workflow run has not reached the end".to_string(),
            ));
        }
        Ok(WorkflowResult {
            final_answer: final_answer(&self.ledger).to_string(),
            steps: self.steps,
            ledger: self.ledger,
        })
    }

    fn check_budget(&self) -> Result<()> {
        let limits = self.engine.limits;
        let elapsed = self.started.elapsed();
        let over_steps = limits.max_steps.is_some_and(|max| self.steps >= max);
        let over_time = limits.max_duration.is_some_and(|max| elapsed >= max);
        if over_steps || over_time {
            return Err(AppError::BudgetExceeded {
                steps: self.steps,
                elapsed_ms: elapsed.as_millis() as u64,
            });
        }
        Ok(())
    }
}

/// Second-to-last entry: the contribution judged by the closing validator.
fn final_answer(ledger: &Ledger) -> &str {
    let messages = ledger.messages();
    messages
        .len()
        .checked_sub(2)
        .and_then(|i| messages.get(i))
        .map(|m| m.content.as_str())
        .unwrap_or_default()
}

/// Assembles a [`WorkflowEngine`], requiring one handler per node.
pub struct WorkflowEngineBuilder {
    nodes: HashMap<NodeId, Arc<dyn Agent>>,
    limits: WorkflowLimits,
    observer: Option<Arc<dyn WorkflowObserver>>,
}

impl WorkflowEngineBuilder {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            limits: WorkflowLimits::default(),
            observer: None,
        }
    }

    /// Register a handler under its own [`Agent::node_id`], replacing any
    /// previous handler for that node.
    pub fn with_node(mut self, agent: Arc<dyn Agent>) -> Self {
        self.nodes.insert(agent.node_id(), agent);
        self
    }

    pub fn with_limits(mut self, limits: WorkflowLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn WorkflowObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(self) -> Result<WorkflowEngine> {
        let missing: Vec<&str> = NodeId::ALL
            .iter()
            .filter(|id| !self.nodes.contains_key(*id))
            .map(|id| id.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Configuration(format!(
                "Workflow is missing handlers for: {}",
                missing.join(", ")
            )));
        }

        Ok(WorkflowEngine {
            nodes: self.nodes,
            limits: self.limits,
            observer: self
                .observer
                .unwrap_or_else(|| Arc::new(TracingObserver)),
        })
    }
}

impl Default for WorkflowEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
