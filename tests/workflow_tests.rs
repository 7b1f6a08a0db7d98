//! End-to-end workflow tests against a scripted oracle.

mod common;

use agentflow::agents::Prompts;
use agentflow::llm::coordinator::MessageRole;
use agentflow::tools::CapabilityRegistry;
use agentflow::workflows::{ObservedEvent, RecordingObserver};
use agentflow::{
    AppError, Author, NodeId, Oracle, Transition, WorkflowEngine, WorkflowEvent, WorkflowLimits,
};
use common::mocks::{CallKind, EchoOracle, MockCapability, ScriptedOracle};
use futures::StreamExt;
use std::sync::Arc;

fn registries() -> (Arc<CapabilityRegistry>, Arc<CapabilityRegistry>) {
    let research =
        CapabilityRegistry::new().with(Arc::new(MockCapability::new("web_search", "results")));
    let coding =
        CapabilityRegistry::new().with(Arc::new(MockCapability::new("python_exec", "4")));
    (Arc::new(research), Arc::new(coding))
}

fn engine(oracle: Arc<dyn Oracle>) -> WorkflowEngine {
    engine_with_limits(oracle, WorkflowLimits::default())
}

fn engine_with_limits(oracle: Arc<dyn Oracle>, limits: WorkflowLimits) -> WorkflowEngine {
    let (research, coding) = registries();
    WorkflowEngine::from_oracle(oracle, research, coding, &Prompts::default())
        .with_limits(limits)
        .build()
        .unwrap()
}

fn authors(result: &agentflow::WorkflowResult) -> Vec<Author> {
    result.ledger.messages().iter().map(|m| m.author).collect()
}

#[tokio::test]
async fn test_two_plus_two() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .route("coder", "This is arithmetic.")
            .answer("4")
            .verdict("FINISH", "2+2 is 4."),
    );
    let engine = engine(oracle.clone());

    let result = engine.run("2+2?").await.unwrap();

    assert_eq!(result.final_answer, "4");
    assert_eq!(result.steps, 3);
    assert_eq!(
        authors(&result),
        vec![Author::User, Author::Supervisor, Author::Coder, Author::Validator]
    );
    let messages = result.ledger.messages();
    assert_eq!(messages[0].content, "2+2?");
    assert_eq!(messages[1].content, "This is arithmetic.");
    assert_eq!(messages[3].content, "2+2 is 4.");

    // the coder was offered only the coding capability set
    let acts = oracle.calls_of(CallKind::Act);
    assert_eq!(acts.len(), 1);
    assert_eq!(acts[0].capabilities, vec!["python_exec"]);
    assert_eq!(acts[0].instruction, Prompts::default().coder);
}

#[tokio::test]
async fn test_enhancer_returns_to_supervisor_without_validation() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .route("enhancer", "Too vague.")
            .completion("Summarize the latest stable Rust release.")
            .route("researcher", "Needs facts.")
            .answer("Rust 1.90 is the latest stable release.")
            .verdict("FINISH", "Answered."),
    );
    let engine = engine(oracle.clone());

    let result = engine.run("rust news").await.unwrap();

    assert_eq!(
        authors(&result),
        vec![
            Author::User,
            Author::Supervisor,
            Author::Enhancer,
            Author::Supervisor,
            Author::Researcher,
            Author::Validator,
        ]
    );
    assert_eq!(result.final_answer, "Rust 1.90 is the latest stable release.");
    assert_eq!(oracle.calls_of(CallKind::Verdict).len(), 1);
    assert_eq!(
        oracle.calls_of(CallKind::Act)[0].capabilities,
        vec!["web_search"]
    );

    // the second supervisor call sees the enhancer's rewrite, attributed by name
    let second_route = &oracle.calls_of(CallKind::Route)[1];
    let enhanced = &second_route.conversation[2];
    assert_eq!(enhanced.name.as_deref(), Some("enhancer"));
    assert_eq!(enhanced.content, "Summarize the latest stable Rust release.");
}

#[tokio::test]
async fn test_validator_sends_work_back() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .route("coder", "math")
            .answer("5")
            .verdict("supervisor", "2+2 is not 5.")
            .route("coder", "try again")
            .answer("4")
            .verdict("FINISH", "correct"),
    );
    let engine = engine(oracle);

    let result = engine.run("2+2?").await.unwrap();
    assert_eq!(result.steps, 6);
    assert_eq!(result.final_answer, "4");
}

#[tokio::test]
async fn test_validator_sees_only_question_and_latest_answer() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .route("coder", "math")
            .answer("4")
            .verdict("FINISH", "ok"),
    );
    engine(oracle.clone()).run("2+2?").await.unwrap();

    let verdict = &oracle.calls_of(CallKind::Verdict)[0];
    assert_eq!(verdict.conversation.len(), 2);
    assert_eq!(verdict.conversation[0].role, MessageRole::User);
    assert_eq!(verdict.conversation[0].content, "2+2?");
    assert_eq!(verdict.conversation[1].role, MessageRole::Assistant);
    assert_eq!(verdict.conversation[1].content, "4");
}

#[tokio::test]
async fn test_stream_events() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .route("coder", "math")
            .answer("4")
            .verdict("FINISH", "ok"),
    );
    let engine = engine(oracle);

    let events: Vec<WorkflowEvent> = engine
        .stream("2+2?")
        .map(|event| event.unwrap())
        .collect()
        .await;

    assert_eq!(events.len(), 3);
    // one append per event
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.ledger_len, i + 2);
        assert_eq!(event.message.author, event.node.author());
    }
    assert_eq!(events[0].next, Transition::Goto(NodeId::Coder));
    assert_eq!(events[1].next, Transition::Goto(NodeId::Validator));
    assert_eq!(events[2].next, Transition::End);
}

#[tokio::test]
async fn test_dropping_stream_abandons_run() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .route("coder", "math")
            .answer("4")
            .verdict("FINISH", "ok"),
    );
    let engine = engine(oracle.clone());

    {
        let mut events = std::pin::pin!(engine.stream("2+2?"));
        let first = events.next().await.unwrap().unwrap();
        assert_eq!(first.node, NodeId::Supervisor);
    }

    // the coder never ran
    assert!(oracle.calls_of(CallKind::Act).is_empty());
}

#[tokio::test]
async fn test_unknown_label_is_contract_violation() {
    let oracle = Arc::new(ScriptedOracle::new().route("unknown", "???"));
    let engine = engine(oracle);

    let mut run = engine.start("2+2?").unwrap();
    let err = run.step().await.unwrap_err();

    match err {
        AppError::OracleContractViolation(detail) => {
            assert!(detail.contains("supervisor"), "{}", detail);
            assert!(detail.contains("unknown"), "{}", detail);
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(run.ledger().len(), 1);
    assert_eq!(run.ledger().question().content, "2+2?");
}

#[tokio::test]
async fn test_supervisor_cannot_pick_validator() {
    let oracle = Arc::new(ScriptedOracle::new().route("validator", "skip the work"));
    let err = engine(oracle).run("2+2?").await.unwrap_err();
    assert!(matches!(err, AppError::OracleContractViolation(_)));
}

#[tokio::test]
async fn test_capability_agent_failure_aborts_run() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .route("coder", "math")
            .failing_answer(AppError::OracleInvocation("rate limited".to_string())),
    );
    let observer = Arc::new(RecordingObserver::new());
    let (research, coding) = registries();
    let engine = WorkflowEngine::from_oracle(oracle, research, coding, &Prompts::default())
        .with_observer(observer.clone())
        .build()
        .unwrap();

    let err = engine.run("2+2?").await.unwrap_err();
    assert!(matches!(err, AppError::OracleInvocation(_)));

    let events = observer.events();
    assert!(matches!(
        events.last(),
        Some(ObservedEvent::Failed {
            node: Some(NodeId::Coder),
            ..
        })
    ));
}

#[tokio::test]
async fn test_step_budget() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .always_route("coder", "again")
            .always_answer("5")
            .always_verdict("supervisor", "still wrong"),
    );
    let limits = WorkflowLimits {
        max_steps: Some(7),
        max_duration: None,
    };
    let engine = engine_with_limits(oracle, limits);

    let err = engine.run("2+2?").await.unwrap_err();
    assert!(matches!(err, AppError::BudgetExceeded { steps: 7, .. }), "{}", err);
}

#[tokio::test]
async fn test_default_budget_stops_endless_loop() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .always_route("researcher", "again")
            .always_answer("not sure")
            .always_verdict("supervisor", "incomplete"),
    );
    let err = engine(oracle).run("?").await.unwrap_err();
    assert!(matches!(err, AppError::BudgetExceeded { steps: 25, .. }));
}

#[tokio::test]
async fn test_empty_query() {
    let oracle = Arc::new(ScriptedOracle::new());
    let engine = engine(oracle.clone());

    assert!(matches!(engine.run(" \n ").await, Err(AppError::EmptyQuery)));
    assert!(oracle.calls().is_empty());
}

#[tokio::test]
async fn test_concurrent_runs_do_not_interfere() {
    let engine = Arc::new(engine(Arc::new(EchoOracle)));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.run(&format!("question {}", i)).await })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.final_answer, format!("answer to: question {}", i));
        assert_eq!(result.ledger.len(), 4);
    }
}

#[tokio::test]
async fn test_custom_prompts_reach_the_oracle() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .route("coder", "math")
            .answer("4")
            .verdict("FINISH", "ok"),
    );
    let prompts = Prompts {
        validator: "Only accept answers in Roman numerals.".to_string(),
        ..Prompts::default()
    };
    let (research, coding) = registries();
    let engine = WorkflowEngine::from_oracle(oracle.clone(), research, coding, &prompts)
        .build()
        .unwrap();

    engine.run("2+2?").await.unwrap();
    assert_eq!(
        oracle.calls_of(CallKind::Verdict)[0].instruction,
        "Only accept answers in Roman numerals."
    );
}
