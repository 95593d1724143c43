use crate::{NodeId, PortIdx, PortRole};

/// A connection from one node's output to another node's input.
/// Each end carries the role it plays relative to the loop level of its own node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: NodeId,
    pub output: PortIdx,
    pub source_role: PortRole,
    pub target: NodeId,
    pub input: PortIdx,
    pub target_role: PortRole,
}
