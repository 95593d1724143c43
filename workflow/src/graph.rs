use std::fmt;

use util::{HashMap, HashSet, Hasher, IdVec, Symbols};

use crate::{
    ConnectionDescription, Direction, Edge, EdgeId, Error, Errors, GraphNode, Hop,
    Malformed, NodeDescription, NodeId, Path, PortIdx, PortRole, WorkflowDescription,
};

// most execution identifiers are uuids:
const AVG_EXE_ID_LEN: usize = 36;

/// Validated, read-only graph of a workflow's nodes and the connections between their ports.
///
/// Nodes and edges live in arenas addressed by [`NodeId`] and [`EdgeId`];
/// outgoing edges are indexed by (node, output port). Nothing is ever mutated after
/// construction, so a `Graph` can be shared across threads as-is.
#[derive(Debug)]
pub struct Graph {
    nodes: IdVec<NodeId, GraphNode>,
    edges: IdVec<EdgeId, Edge>,
    exe_ids: Symbols<NodeId>,
    outgoing: HashMap<(NodeId, PortIdx), Vec<EdgeId>>,
}

impl TryFrom<WorkflowDescription> for Graph {
    type Error = Error;

    /// Build a graph, failing with [`Error::MalformedGraph`] if any node or
    /// connection references something that wasn't declared.
    fn try_from(desc: WorkflowDescription) -> Result<Self, Self::Error> {
        let mut errors = Errors::default();

        let mut nodes = IdVec::with_capacity(desc.nodes.len());
        let mut exe_ids = Symbols::with_capacity_and_avg_len(desc.nodes.len(), AVG_EXE_ID_LEN);

        for node in desc.nodes {
            let (id, is_new) = exe_ids.intern(&node.exe_id);
            if !is_new {
                errors.add(Malformed::DuplicateNode(node.exe_id));
                continue;
            }
            check_ports(&node, &mut errors);
            let pushed: NodeId = nodes.push(GraphNode {
                id,
                name: node.name.unwrap_or_else(|| node.exe_id.clone()),
                exe_id: node.exe_id,
                inputs: node.inputs,
                outputs: node.outputs,
                is_driver: node.is_driver,
            });
            debug_assert_eq!(id, pushed);
        }

        let mut edges = IdVec::with_capacity(desc.connections.len());
        let mut outgoing: HashMap<(NodeId, PortIdx), Vec<EdgeId>> =
            HashMap::with_capacity_and_hasher(desc.connections.len(), Hasher::default());
        let mut seen: HashSet<Edge> =
            HashSet::with_capacity_and_hasher(desc.connections.len(), Hasher::default());

        for conn in &desc.connections {
            let Some(edge) = resolve_connection(conn, &nodes, &exe_ids, &mut errors) else {
                continue;
            };
            if !seen.insert(edge) {
                log::warn!("Ignoring duplicate connection {}", conn.label());
                continue;
            }
            let id = edges.push(edge);
            outgoing
                .entry((edge.source, edge.output))
                .or_default()
                .push(id);
        }

        errors.finish("building workflow graph")?;

        log::debug!(
            "Built workflow graph with {} nodes and {} edges",
            nodes.len(),
            edges.len(),
        );

        Ok(Self {
            nodes,
            edges,
            exe_ids,
            outgoing,
        })
    }
}

fn check_ports(node: &NodeDescription, errors: &mut Errors) {
    for (ports, direction) in [
        (&node.inputs, Direction::Input),
        (&node.outputs, Direction::Output),
    ] {
        if ports.len() > PortIdx::MAX_PORTS {
            errors.add(Malformed::TooManyPorts {
                node: node.exe_id.clone(),
                direction,
                count: ports.len(),
            });
        }
    }

    let mut ids: HashSet<&str> =
        HashSet::with_capacity_and_hasher(node.inputs.len() + node.outputs.len(), Hasher::default());
    for port in node.inputs.iter().chain(&node.outputs) {
        if !ids.insert(port.id.as_str()) {
            errors.add(Malformed::DuplicatePort {
                node: node.exe_id.clone(),
                port: port.id.clone(),
            });
        }
    }

    // outputs are addressed by name in hop results, so names must be unique too:
    let mut names: HashSet<&str> =
        HashSet::with_capacity_and_hasher(node.outputs.len(), Hasher::default());
    for port in &node.outputs {
        if !names.insert(port.name.as_str()) {
            errors.add(Malformed::DuplicateOutputName {
                node: node.exe_id.clone(),
                name: port.name.clone(),
            });
        }
    }
}

/// Turn a connection description into an edge, recording an error
/// for every end that doesn't resolve.
fn resolve_connection(
    conn: &ConnectionDescription,
    nodes: &IdVec<NodeId, GraphNode>,
    exe_ids: &Symbols<NodeId>,
    errors: &mut Errors,
) -> Option<Edge> {
    let source = resolve_endpoint(conn, Direction::Output, nodes, exe_ids, errors);
    let target = resolve_endpoint(conn, Direction::Input, nodes, exe_ids, errors);
    let ((source, output), (target, input)) = (source?, target?);
    Some(Edge {
        source,
        output,
        source_role: conn.source.role,
        target,
        input,
        target_role: conn.target.role,
    })
}

fn resolve_endpoint(
    conn: &ConnectionDescription,
    direction: Direction,
    nodes: &IdVec<NodeId, GraphNode>,
    exe_ids: &Symbols<NodeId>,
    errors: &mut Errors,
) -> Option<(NodeId, PortIdx)> {
    let endpoint = match direction {
        Direction::Output => &conn.source,
        Direction::Input => &conn.target,
    };

    let Some(id) = exe_ids.find(&endpoint.node) else {
        errors.add(Malformed::DanglingNode {
            edge: conn.label(),
            node: endpoint.node.clone(),
        });
        return None;
    };

    let node = nodes.get(id);
    let port = match direction {
        Direction::Output => node.find_output(&endpoint.port),
        Direction::Input => node.find_input(&endpoint.port),
    };
    if port.is_none() {
        errors.add(Malformed::DanglingPort {
            edge: conn.label(),
            node: endpoint.node.clone(),
            port: endpoint.port.clone(),
            direction,
        });
    }
    port.map(|port| (id, port))
}

// LOOKUPS /////////////////////
impl Graph {
    /// Get the node declared with execution identifier `exe_id`.
    pub fn node(&self, exe_id: &str) -> Result<&GraphNode, Error> {
        self.node_id(exe_id).map(|id| self.get(id))
    }

    /// Get the arena id of the node declared with execution identifier `exe_id`.
    pub fn node_id(&self, exe_id: &str) -> Result<NodeId, Error> {
        self.exe_ids
            .find(exe_id)
            .ok_or_else(|| Error::NodeNotFound(exe_id.to_owned()))
    }

    /// Get the node with arena id `id`.
    #[inline]
    pub fn get(&self, id: NodeId) -> &GraphNode {
        self.nodes.get(id)
    }

    /// Execution identifier of the node with arena id `id`.
    #[inline]
    pub fn exe_id(&self, id: NodeId) -> &str {
        self.exe_ids.get(id)
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        self.edges.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.enumerate()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Ids of edges leaving `output` of `node`. Empty if the output is unconnected.
    pub fn outgoing(&self, node: NodeId, output: PortIdx) -> &[EdgeId] {
        self.outgoing
            .get(&(node, output))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Ids of all edges leaving any output of `node`, in output declaration order.
    pub fn all_outgoing(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.get(node)
            .output_idxs()
            .flat_map(move |output| self.outgoing(node, output).iter().copied())
    }

    /// Edges leaving the output port `port_id` of node `exe_id`.
    /// An unconnected output yields no edges; that is not an error.
    pub fn outgoing_edges(
        &self,
        exe_id: &str,
        port_id: &str,
    ) -> Result<impl Iterator<Item = &Edge> + '_, Error> {
        let node = self.node(exe_id)?;
        let output = node.find_output(port_id).ok_or_else(|| Error::PortNotFound {
            node: exe_id.to_owned(),
            port: port_id.to_owned(),
        })?;
        Ok(self
            .outgoing(node.id(), output)
            .iter()
            .map(|id| self.edge(*id)))
    }

    /// True if `node` is not a driver, but has outgoing connections both at its own
    /// loop level and to the enclosing one, i.e. it runs a loop it doesn't control.
    pub fn is_sub_loop_controller(&self, node: NodeId) -> bool {
        if self.get(node).is_driver() {
            return false;
        }
        let mut same = false;
        let mut outer = false;
        for id in self.all_outgoing(node) {
            match self.edge(id).source_role {
                PortRole::Same => same = true,
                PortRole::Outer => outer = true,
                PortRole::Inner => {}
            }
        }
        same && outer
    }
}

// DISPLAY /////////////////////
impl Graph {
    /// Render `hop` as `source:output -> target:input`.
    pub fn display_hop<'a>(&'a self, hop: &'a Hop) -> HopDisplay<'a> {
        HopDisplay { graph: self, hop }
    }

    /// Render `path` as a chain of hops.
    pub fn display_path<'a>(&'a self, path: &'a Path) -> PathDisplay<'a> {
        PathDisplay { graph: self, path }
    }
}

pub struct HopDisplay<'a> {
    graph: &'a Graph,
    hop: &'a Hop,
}

impl fmt::Display for HopDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self.graph.get(self.hop.source);
        let target = self.graph.get(self.hop.target);
        write!(
            f,
            "{}:{} -> {}:{}",
            source.exe_id(),
            source.output(self.hop.output).name,
            target.exe_id(),
            target.input(self.hop.input).name,
        )
    }
}

pub struct PathDisplay<'a> {
    graph: &'a Graph,
    path: &'a Path,
}

impl fmt::Display for PathDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, hop) in self.path.hops().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", self.graph.display_hop(hop))?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Endpoint;
    use anyhow::Result;

    fn two_nodes() -> WorkflowDescription {
        let mut desc = WorkflowDescription::default();
        desc.add_node(
            NodeDescription::new("a")
                .driver()
                .input("a-in", "inp_0")
                .output("a-out", "out_0"),
        )
        .add_node(
            NodeDescription::new("b")
                .input("b-in", "inp_0")
                .output("b-out", "out_0"),
        );
        desc
    }

    #[test]
    fn test_build_and_lookup() -> Result<()> {
        let mut desc = two_nodes();
        desc.connect(
            Endpoint::new("a", "a-out", PortRole::Same),
            Endpoint::new("b", "b-in", PortRole::Same),
        )
        .connect(
            Endpoint::new("b", "b-out", PortRole::Same),
            Endpoint::new("a", "a-in", PortRole::Same),
        );
        let graph = Graph::try_from(desc)?;

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
        let a = graph.node("a")?;
        assert!(a.is_driver());
        assert_eq!(a.name(), "a");
        assert_eq!(graph.exe_id(a.id()), "a");

        let out: Vec<_> = graph.outgoing_edges("a", "a-out")?.collect();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].target, graph.node_id("b")?);
        Ok(())
    }

    #[test]
    fn test_unconnected_output_is_empty() -> Result<()> {
        let graph = Graph::try_from(two_nodes())?;
        assert_eq!(graph.outgoing_edges("b", "b-out")?.count(), 0);
        Ok(())
    }

    #[test]
    fn test_unknown_lookups() -> Result<()> {
        let graph = Graph::try_from(two_nodes())?;
        assert!(matches!(graph.node("zzz"), Err(Error::NodeNotFound(_))));
        assert!(matches!(
            graph.outgoing_edges("a", "a-in"),
            Err(Error::PortNotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_dangling_target_node() {
        let mut desc = two_nodes();
        desc.connect(
            Endpoint::new("a", "a-out", PortRole::Same),
            Endpoint::new("ghost", "g-in", PortRole::Same),
        );
        let e = Graph::try_from(desc).unwrap_err();
        match e {
            Error::MalformedGraph(Malformed::DanglingNode { edge, node }) => {
                assert_eq!(node, "ghost");
                assert!(edge.contains("a:a-out"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dangling_target_port() {
        let mut desc = two_nodes();
        // an output used as if it were an input:
        desc.connect(
            Endpoint::new("a", "a-out", PortRole::Same),
            Endpoint::new("b", "b-out", PortRole::Same),
        );
        let e = Graph::try_from(desc).unwrap_err();
        assert!(matches!(
            e,
            Error::MalformedGraph(Malformed::DanglingPort {
                direction: Direction::Input,
                ..
            })
        ));
    }

    #[test]
    fn test_all_problems_are_counted() {
        let mut desc = two_nodes();
        desc.add_node(NodeDescription::new("a"));
        desc.connect(
            Endpoint::new("nope", "x", PortRole::Same),
            Endpoint::new("b", "nah", PortRole::Same),
        );
        let e = Graph::try_from(desc).unwrap_err();
        match e {
            Error::MalformedGraph(Malformed::Aggregated { first, more }) => {
                assert!(matches!(*first, Malformed::DuplicateNode(_)));
                assert_eq!(more, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_output_names() {
        let mut desc = WorkflowDescription::default();
        desc.add_node(
            NodeDescription::new("a")
                .output("o1", "out")
                .output("o2", "out"),
        );
        assert!(matches!(
            Graph::try_from(desc),
            Err(Error::MalformedGraph(Malformed::DuplicateOutputName { .. }))
        ));
    }

    fn wide_node(inputs: usize) -> NodeDescription {
        let mut node = NodeDescription::new("wide");
        node.inputs = (0..inputs)
            .map(|i| crate::Port::new(format!("in{i}"), format!("inp_{i}")))
            .collect();
        node
    }

    #[test]
    fn test_port_count_limit() -> Result<()> {
        let mut desc = WorkflowDescription::default();
        desc.add_node(wide_node(PortIdx::MAX_PORTS));
        let graph = Graph::try_from(desc)?;
        let last = graph.node("wide")?.find_input("in65535");
        assert_eq!(last.map(usize::from), Some(65535));

        let mut desc = WorkflowDescription::default();
        desc.add_node(wide_node(PortIdx::MAX_PORTS + 1));
        match Graph::try_from(desc) {
            Err(Error::MalformedGraph(Malformed::TooManyPorts {
                direction: Direction::Input,
                count,
                ..
            })) => assert_eq!(count, PortIdx::MAX_PORTS + 1),
            other => panic!("unexpected result: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_duplicate_connections_collapse() -> Result<()> {
        let mut desc = two_nodes();
        for _ in 0..2 {
            desc.connect(
                Endpoint::new("a", "a-out", PortRole::Same),
                Endpoint::new("b", "b-in", PortRole::Same),
            );
        }
        let graph = Graph::try_from(desc)?;
        assert_eq!(graph.edge_count(), 1);
        Ok(())
    }

    #[test]
    fn test_sub_loop_controller() -> Result<()> {
        let mut desc = WorkflowDescription::default();
        desc.add_node(
            NodeDescription::new("mem")
                .input("m-in", "inp_0")
                .output("m-out0", "out_0")
                .output("m-out1", "out_1"),
        )
        .add_node(NodeDescription::new("x").input("x-in", "inp_0"))
        .add_node(NodeDescription::new("y").input("y-in", "inp_0"))
        .connect(
            Endpoint::new("mem", "m-out0", PortRole::Outer),
            Endpoint::new("x", "x-in", PortRole::Same),
        )
        .connect(
            Endpoint::new("mem", "m-out1", PortRole::Same),
            Endpoint::new("y", "y-in", PortRole::Same),
        );
        let graph = Graph::try_from(desc)?;
        assert!(graph.is_sub_loop_controller(graph.node_id("mem")?));
        assert!(!graph.is_sub_loop_controller(graph.node_id("x")?));
        Ok(())
    }
}
