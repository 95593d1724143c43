use workflow::{EdgeId, Graph, NodeId, PortIdx, PortRole};

/// How a walk arrived at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entry {
    /// the node the walk started from.
    Start,
    /// reached through an input playing this role for the node.
    Via(PortRole),
}

/// Which edge-selection rules a walk follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Walk out towards the governing driver: a driver at the start reports to its
    /// enclosing level, and sub-loop controllers hand over between levels.
    Exit,
    /// Walk a driver's own loop body looking for its back-edges.
    Reset,
    /// Plain forward data flow: every `Same` and `Outer` edge, at every node.
    Flow,
}

/// Source roles a node's outgoing edges may have in order to be followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Accept {
    same: bool,
    outer: bool,
}

impl Accept {
    const NONE: Self = Self { same: false, outer: false };
    const BOTH: Self = Self { same: true, outer: true };

    fn only(role: PortRole) -> Self {
        match role {
            PortRole::Same => Self { same: true, outer: false },
            PortRole::Outer => Self { same: false, outer: true },
            PortRole::Inner => Self::NONE,
        }
    }

    fn opposite(role: PortRole) -> Self {
        match role {
            PortRole::Same => Self::only(PortRole::Outer),
            PortRole::Outer => Self::only(PortRole::Same),
            PortRole::Inner => Self::NONE,
        }
    }

    // inner edges carry broadcasts down into nested loops; no walk ever follows them.
    fn accepts(self, role: PortRole) -> bool {
        match role {
            PortRole::Same => self.same,
            PortRole::Outer => self.outer,
            PortRole::Inner => false,
        }
    }
}

fn accepted(graph: &Graph, node: NodeId, entry: Entry, walk: Walk) -> Accept {
    let is_driver = graph.get(node).is_driver();
    match entry {
        Entry::Via(PortRole::Inner) => Accept::NONE,
        Entry::Start => match (is_driver, walk) {
            (true, Walk::Exit) => Accept::only(PortRole::Outer),
            (true, Walk::Reset) => Accept::only(PortRole::Same),
            _ => Accept::BOTH,
        },
        Entry::Via(_) if walk == Walk::Flow => Accept::BOTH,
        // entered through an outer input: a nested loop we pass through and leave the same way.
        // entered through a same-level input: a loop-back into its body.
        Entry::Via(role) if is_driver => Accept::only(role),
        Entry::Via(role) if walk == Walk::Exit && graph.is_sub_loop_controller(node) => {
            Accept::opposite(role)
        }
        Entry::Via(_) => Accept::BOTH,
    }
}

/// Edges a walk continues along after reaching `node`, in output declaration order.
pub fn next_edges(
    graph: &Graph,
    node: NodeId,
    entry: Entry,
    walk: Walk,
) -> impl Iterator<Item = EdgeId> + '_ {
    let accept = accepted(graph, node, entry, walk);
    graph
        .all_outgoing(node)
        .filter(move |id| accept.accepts(graph.edge(*id).source_role))
}

/// Edges a walk starting at `node` takes out of the single output `output`.
pub fn start_edges(
    graph: &Graph,
    node: NodeId,
    output: PortIdx,
    walk: Walk,
) -> impl Iterator<Item = EdgeId> + '_ {
    let accept = accepted(graph, node, Entry::Start, walk);
    graph
        .outgoing(node, output)
        .iter()
        .copied()
        .filter(move |id| accept.accepts(graph.edge(*id).source_role))
}
