use crate::{NodeId, PortIdx};

/// An input or output endpoint of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    /// Identifier used to address this port in connections.
    pub id: String,
    /// Human-readable name; only used for addressing results and display.
    pub name: String,
}

impl Port {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A component in the workflow graph. Immutable once the graph is built.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub(crate) id: NodeId,
    pub(crate) exe_id: String,
    pub(crate) name: String,
    pub(crate) inputs: Vec<Port>,
    pub(crate) outputs: Vec<Port>,
    pub(crate) is_driver: bool,
}

impl GraphNode {
    /// Arena id of this node within its graph.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Execution identifier this node was declared with.
    #[inline]
    pub fn exe_id(&self) -> &str {
        &self.exe_id
    }

    /// Display name; defaults to the execution identifier.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if this node controls a loop and can be the result of driver resolution.
    #[inline]
    pub fn is_driver(&self) -> bool {
        self.is_driver
    }

    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    #[inline]
    pub fn input(&self, idx: PortIdx) -> &Port {
        &self.inputs[usize::from(idx)]
    }

    #[inline]
    pub fn output(&self, idx: PortIdx) -> &Port {
        &self.outputs[usize::from(idx)]
    }

    /// Indexes of all declared outputs, in declaration order.
    pub fn output_idxs(&self) -> impl Iterator<Item = PortIdx> {
        (0..self.outputs.len()).map(PortIdx::from)
    }

    pub fn find_input(&self, port_id: &str) -> Option<PortIdx> {
        find_port(&self.inputs, port_id)
    }

    pub fn find_output(&self, port_id: &str) -> Option<PortIdx> {
        find_port(&self.outputs, port_id)
    }
}

// nodes rarely have more than a handful of ports, so a scan is fine here.
fn find_port(ports: &[Port], port_id: &str) -> Option<PortIdx> {
    ports.iter().position(|p| p.id == port_id).map(PortIdx::from)
}
