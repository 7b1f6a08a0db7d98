//! Node identities and the static transition table.
//!
//! The table is the single source of truth for which moves the engine will
//! accept. Handlers return a [`Transition`]; anything not listed for the
//! emitting node is rejected before the ledger is touched.

use crate::types::Author;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of the workflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeId {
    Supervisor,
    Enhancer,
    Researcher,
    Coder,
    Validator,
}

/// Where control goes after a node has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    Goto(NodeId),
    /// Terminal marker. Only the validator may emit it.
    End,
}

/// Node that receives the freshly created ledger.
pub const ENTRY_NODE: NodeId = NodeId::Supervisor;

const SUPERVISOR_NEXT: &[Transition] = &[
    Transition::Goto(NodeId::Enhancer),
    Transition::Goto(NodeId::Researcher),
    Transition::Goto(NodeId::Coder),
];
const ENHANCER_NEXT: &[Transition] = &[Transition::Goto(NodeId::Supervisor)];
const WORKER_NEXT: &[Transition] = &[Transition::Goto(NodeId::Validator)];
const VALIDATOR_NEXT: &[Transition] = &[Transition::Goto(NodeId::Supervisor), Transition::End];

impl NodeId {
    pub const ALL: [NodeId; 5] = [
        NodeId::Supervisor,
        NodeId::Enhancer,
        NodeId::Researcher,
        NodeId::Coder,
        NodeId::Validator,
    ];

    pub fn as_str(&self) -> &'static str {
        self.author().as_str()
    }

    /// Author stamped on every message this node contributes.
    pub fn author(&self) -> Author {
        match self {
            NodeId::Supervisor => Author::Supervisor,
            NodeId::Enhancer => Author::Enhancer,
            NodeId::Researcher => Author::Researcher,
            NodeId::Coder => Author::Coder,
            NodeId::Validator => Author::Validator,
        }
    }

    /// Transitions this node is allowed to emit.
    pub fn successors(&self) -> &'static [Transition] {
        match self {
            NodeId::Supervisor => SUPERVISOR_NEXT,
            NodeId::Enhancer => ENHANCER_NEXT,
            NodeId::Researcher | NodeId::Coder => WORKER_NEXT,
            NodeId::Validator => VALIDATOR_NEXT,
        }
    }

    pub fn allows(&self, transition: Transition) -> bool {
        self.successors().contains(&transition)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Goto(node) => write!(f, "{}", node),
            Transition::End => f.write_str("END"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_validator_can_end() {
        for node in NodeId::ALL {
            assert_eq!(
                node.allows(Transition::End),
                node == NodeId::Validator,
                "{} END permission",
                node
            );
        }
    }

    #[test]
    fn test_fixed_routes() {
        assert_eq!(
            NodeId::Enhancer.successors(),
            &[Transition::Goto(NodeId::Supervisor)]
        );
        assert_eq!(
            NodeId::Researcher.successors(),
            &[Transition::Goto(NodeId::Validator)]
        );
        assert_eq!(
            NodeId::Coder.successors(),
            &[Transition::Goto(NodeId::Validator)]
        );
    }

    #[test]
    fn test_supervisor_never_routes_to_decision_nodes() {
        assert!(!NodeId::Supervisor.allows(Transition::Goto(NodeId::Validator)));
        assert!(!NodeId::Supervisor.allows(Transition::Goto(NodeId::Supervisor)));
        assert!(NodeId::Supervisor.allows(Transition::Goto(NodeId::Coder)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Transition::End.to_string(), "END");
        assert_eq!(Transition::Goto(NodeId::Coder).to_string(), "coder");
        assert_eq!(ENTRY_NODE, NodeId::Supervisor);
    }
}
