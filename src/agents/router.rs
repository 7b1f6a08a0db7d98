//! Closed label sets for the two decision nodes.
//!
//! The oracle speaks in strings; the workflow only accepts these enums.
//! Anything that does not map onto a variant is a contract violation, never
//! a silent default route.

use crate::llm::coordinator::ConversationMessage;
use crate::llm::oracle::Oracle;
use crate::types::{AppError, Result};
use crate::workflows::graph::{NodeId, Transition};

/// A closed set of routing labels one decision node may emit.
pub trait RouteLabel: Sized + Copy {
    /// Canonical spellings, offered to the oracle in this order.
    const LABELS: &'static [&'static str];

    fn from_label(label: &str) -> Option<Self>;

    fn transition(self) -> Transition;
}

/// Workers the supervisor can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorRoute {
    Enhancer,
    Researcher,
    Coder,
}

impl RouteLabel for SupervisorRoute {
    const LABELS: &'static [&'static str] = &["enhancer", "researcher", "coder"];

    fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "enhancer" => Some(SupervisorRoute::Enhancer),
            "researcher" => Some(SupervisorRoute::Researcher),
            "coder" => Some(SupervisorRoute::Coder),
            _ => None,
        }
    }

    fn transition(self) -> Transition {
        match self {
            SupervisorRoute::Enhancer => Transition::Goto(NodeId::Enhancer),
            SupervisorRoute::Researcher => Transition::Goto(NodeId::Researcher),
            SupervisorRoute::Coder => Transition::Goto(NodeId::Coder),
        }
    }
}

/// The validator's verdict on the latest answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorVerdict {
    /// Not good enough, go around again.
    Supervisor,
    Finish,
}

impl RouteLabel for ValidatorVerdict {
    const LABELS: &'static [&'static str] = &["supervisor", "FINISH"];

    fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "supervisor" => Some(ValidatorVerdict::Supervisor),
            "finish" => Some(ValidatorVerdict::Finish),
            _ => None,
        }
    }

    fn transition(self) -> Transition {
        match self {
            ValidatorVerdict::Supervisor => Transition::Goto(NodeId::Supervisor),
            ValidatorVerdict::Finish => Transition::End,
        }
    }
}

/// A typed routing decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision<R> {
    pub route: R,
    pub rationale: String,
}

/// Ask the oracle to classify and map the answer onto `R`.
///
/// Contract violations are tagged with the deciding node.
pub async fn decide<R: RouteLabel>(
    oracle: &dyn Oracle,
    node: NodeId,
    instruction: &str,
    conversation: &[ConversationMessage],
) -> Result<Decision<R>> {
    let decision = oracle
        .classify(instruction, conversation, R::LABELS)
        .await
        .map_err(|e| match e {
            AppError::OracleContractViolation(detail) => {
                AppError::OracleContractViolation(format!("{}: {}", node, detail))
            }
            other => other,
        })?;

    let route = R::from_label(&decision.next).ok_or_else(|| {
        AppError::OracleContractViolation(format!(
            "{}: label '{}' is not one of [{}]",
            node,
            decision.next,
            R::LABELS.join(", ")
        ))
    })?;

    tracing::debug!(node = %node, label = %decision.next, "Routing decision");
    Ok(Decision {
        route,
        rationale: decision.rationale,
    })
}
