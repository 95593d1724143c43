//! In-memory workflow description, as handed over by the component execution
//! subsystem. This is the only way to construct a [`crate::Graph`].

use crate::{Port, PortRole};

/// Declaration of a single node.
#[derive(Debug, Clone)]
pub struct NodeDescription {
    pub exe_id: String,
    pub name: Option<String>,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    pub is_driver: bool,
}

impl NodeDescription {
    pub fn new(exe_id: impl Into<String>) -> Self {
        Self {
            exe_id: exe_id.into(),
            name: None,
            inputs: Vec::with_capacity(2),
            outputs: Vec::with_capacity(2),
            is_driver: false,
        }
    }

    /// Mark this node as a loop driver.
    pub fn driver(mut self) -> Self {
        self.is_driver = true;
        self
    }

    /// Set a display name for logs and graph output.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn input(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.inputs.push(Port::new(id, name));
        self
    }

    pub fn output(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.outputs.push(Port::new(id, name));
        self
    }
}

/// One end of a connection: a port on a node, and the role it plays for that node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub node: String,
    pub port: String,
    pub role: PortRole,
}

impl Endpoint {
    pub fn new(node: impl Into<String>, port: impl Into<String>, role: PortRole) -> Self {
        Self {
            node: node.into(),
            port: port.into(),
            role,
        }
    }
}

/// Declaration of a connection from `source` (an output) to `target` (an input).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescription {
    pub source: Endpoint,
    pub target: Endpoint,
}

impl ConnectionDescription {
    /// Short form used to name this connection in error messages.
    pub fn label(&self) -> String {
        format!(
            "{}:{} ({}) -> {}:{} ({})",
            self.source.node,
            self.source.port,
            self.source.role,
            self.target.node,
            self.target.port,
            self.target.role,
        )
    }
}

/// Full static description of a workflow's nodes and connections.
#[derive(Debug, Clone, Default)]
pub struct WorkflowDescription {
    pub nodes: Vec<NodeDescription>,
    pub connections: Vec<ConnectionDescription>,
}

impl WorkflowDescription {
    pub fn add_node(&mut self, node: NodeDescription) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn connect(&mut self, source: Endpoint, target: Endpoint) -> &mut Self {
        self.connections
            .push(ConnectionDescription { source, target });
        self
    }
}
