//! Mock implementations for testing.
//!
//! Scripted oracles, LLM clients and capabilities shared by the integration
//! tests, so no test needs a network or a model.

#![allow(dead_code)]

use agentflow::llm::coordinator::ConversationMessage;
use agentflow::llm::{LLMClient, LLMResponse, Oracle, RoutingDecision};
use agentflow::tools::{Capability, CapabilityRegistry};
use agentflow::types::{AppError, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Which oracle entry point a recorded call went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Route,
    Verdict,
    Complete,
    Act,
}

/// One recorded oracle call.
#[derive(Debug, Clone)]
pub struct OracleCall {
    pub kind: CallKind,
    pub instruction: String,
    pub conversation: Vec<ConversationMessage>,
    /// Capability names offered (only for `Act`).
    pub capabilities: Vec<String>,
}

/// Queue of scripted replies with an optional reply used once it runs dry.
struct Script<T: Clone> {
    queue: VecDeque<Result<T>>,
    fallback: Option<T>,
}

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            fallback: None,
        }
    }

    fn next(&mut self, what: &str) -> Result<T> {
        match self.queue.pop_front() {
            Some(item) => item,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| AppError::OracleInvocation(format!("{} script exhausted", what))),
        }
    }
}

/// Oracle that replays scripted answers.
///
/// Supervisor and validator decisions are told apart by the label set the
/// caller offers (`FINISH` is only ever offered to the validator). Labels are
/// returned exactly as scripted, so out-of-set labels reach the node.
pub struct ScriptedOracle {
    routes: Mutex<Script<RoutingDecision>>,
    verdicts: Mutex<Script<RoutingDecision>>,
    completions: Mutex<Script<String>>,
    answers: Mutex<Script<String>>,
    calls: Mutex<Vec<OracleCall>>,
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(Script::new()),
            verdicts: Mutex::new(Script::new()),
            completions: Mutex::new(Script::new()),
            answers: Mutex::new(Script::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a supervisor decision.
    pub fn route(self, label: &str, reason: &str) -> Self {
        self.routes
            .lock()
            .queue
            .push_back(Ok(RoutingDecision::new(label, reason)));
        self
    }

    /// Supervisor decision used whenever the queue is empty.
    pub fn always_route(self, label: &str, reason: &str) -> Self {
        self.routes.lock().fallback = Some(RoutingDecision::new(label, reason));
        self
    }

    /// Queue a validator decision.
    pub fn verdict(self, label: &str, reason: &str) -> Self {
        self.verdicts
            .lock()
            .queue
            .push_back(Ok(RoutingDecision::new(label, reason)));
        self
    }

    pub fn always_verdict(self, label: &str, reason: &str) -> Self {
        self.verdicts.lock().fallback = Some(RoutingDecision::new(label, reason));
        self
    }

    /// Queue an enhancer completion.
    pub fn completion(self, text: &str) -> Self {
        self.completions.lock().queue.push_back(Ok(text.to_string()));
        self
    }

    /// Queue a researcher/coder answer.
    pub fn answer(self, text: &str) -> Self {
        self.answers.lock().queue.push_back(Ok(text.to_string()));
        self
    }

    pub fn always_answer(self, text: &str) -> Self {
        self.answers.lock().fallback = Some(text.to_string());
        self
    }

    /// Queue a failing researcher/coder call.
    pub fn failing_answer(self, error: AppError) -> Self {
        self.answers.lock().queue.push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<OracleCall> {
        self.calls.lock().clone()
    }

    pub fn calls_of(&self, kind: CallKind) -> Vec<OracleCall> {
        self.calls().into_iter().filter(|c| c.kind == kind).collect()
    }

    fn record(
        &self,
        kind: CallKind,
        instruction: &str,
        conversation: &[ConversationMessage],
        capabilities: Vec<String>,
    ) {
        self.calls.lock().push(OracleCall {
            kind,
            instruction: instruction.to_string(),
            conversation: conversation.to_vec(),
            capabilities,
        });
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn classify(
        &self,
        instruction: &str,
        conversation: &[ConversationMessage],
        allowed: &[&str],
    ) -> Result<RoutingDecision> {
        if allowed.contains(&"FINISH") {
            self.record(CallKind::Verdict, instruction, conversation, Vec::new());
            self.verdicts.lock().next("verdict")
        } else {
            self.record(CallKind::Route, instruction, conversation, Vec::new());
            self.routes.lock().next("route")
        }
    }

    async fn complete(
        &self,
        instruction: &str,
        conversation: &[ConversationMessage],
    ) -> Result<String> {
        self.record(CallKind::Complete, instruction, conversation, Vec::new());
        self.completions.lock().next("completion")
    }

    async fn act_and_observe(
        &self,
        instruction: &str,
        conversation: &[ConversationMessage],
        capabilities: &CapabilityRegistry,
    ) -> Result<String> {
        self.record(CallKind::Act, instruction, conversation, capabilities.names());
        self.answers.lock().next("answer")
    }
}

/// Stateless oracle whose answers derive from the conversation itself:
/// always routes to the coder, which echoes the question, which the validator
/// accepts. Yields between calls so concurrent runs interleave.
pub struct EchoOracle;

#[async_trait]
impl Oracle for EchoOracle {
    async fn classify(
        &self,
        _instruction: &str,
        _conversation: &[ConversationMessage],
        allowed: &[&str],
    ) -> Result<RoutingDecision> {
        tokio::task::yield_now().await;
        if allowed.contains(&"FINISH") {
            Ok(RoutingDecision::new("FINISH", "matches the question"))
        } else {
            Ok(RoutingDecision::new("coder", "echo it"))
        }
    }

    async fn complete(
        &self,
        _instruction: &str,
        conversation: &[ConversationMessage],
    ) -> Result<String> {
        Ok(conversation[0].content.clone())
    }

    async fn act_and_observe(
        &self,
        _instruction: &str,
        conversation: &[ConversationMessage],
        _capabilities: &CapabilityRegistry,
    ) -> Result<String> {
        tokio::task::yield_now().await;
        Ok(format!("answer to: {}", conversation[0].content))
    }
}

/// LLM client that replays scripted responses and records every request.
pub struct MockLLMClient {
    responses: Mutex<VecDeque<Result<LLMResponse>>>,
    requests: Mutex<Vec<(Vec<ConversationMessage>, Vec<ToolDefinition>)>>,
}

impl MockLLMClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a plain text reply.
    pub fn text(self, content: &str) -> Self {
        self.responses.lock().push_back(Ok(LLMResponse {
            content: content.to_string(),
            tool_calls: vec![],
            finish_reason: "stop".to_string(),
        }));
        self
    }

    /// Queue a reply requesting one tool call with `{"input": ...}`.
    pub fn tool_call(self, name: &str, input: &str) -> Self {
        let id = format!("call_{}", self.responses.lock().len());
        self.responses.lock().push_back(Ok(LLMResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id,
                name: name.to_string(),
                arguments: serde_json::json!({ "input": input }),
            }],
            finish_reason: "tool_calls".to_string(),
        }));
        self
    }

    /// Queue a failing call.
    pub fn failure(self, message: &str) -> Self {
        self.responses
            .lock()
            .push_back(Err(AppError::OracleInvocation(message.to_string())));
        self
    }

    pub fn requests(&self) -> Vec<(Vec<ConversationMessage>, Vec<ToolDefinition>)> {
        self.requests.lock().clone()
    }

    fn next(&self, messages: &[ConversationMessage], tools: &[ToolDefinition]) -> Result<LLMResponse> {
        self.requests.lock().push((messages.to_vec(), tools.to_vec()));
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::OracleInvocation("Mock LLM exhausted".to_string())))
    }
}

impl Default for MockLLMClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate_with_history(&self, messages: &[ConversationMessage]) -> Result<String> {
        Ok(self.next(messages, &[])?.content)
    }

    async fn generate_with_tools_and_history(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        self.next(messages, tools)
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Capability that returns a fixed output and records its inputs.
pub struct MockCapability {
    name: String,
    output: std::result::Result<String, String>,
    inputs: Mutex<Vec<String>>,
}

impl MockCapability {
    pub fn new(name: &str, output: &str) -> Self {
        Self {
            name: name.to_string(),
            output: Ok(output.to_string()),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            output: Err(message.to_string()),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().clone()
    }
}

#[async_trait]
impl Capability for MockCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Mock capability"
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        self.inputs.lock().push(input.to_string());
        match &self.output {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(AppError::CapabilityInvocation(message.clone())),
        }
    }
}
