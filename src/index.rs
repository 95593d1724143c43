use colored::Colorize;
use traverse::DriverResolver;
use util::IdVec;
use workflow::{Error, Graph, GraphNode, NodeId};

/// Governing driver of every node, resolved once up front.
/// Nodes outside of any loop (including outermost drivers) have none.
#[derive(Debug)]
pub struct DriverIndex<'a> {
    graph: &'a Graph,
    drivers: IdVec<NodeId, Option<NodeId>>,
}

impl<'a> DriverIndex<'a> {
    pub(crate) fn build(graph: &'a Graph, resolver: DriverResolver<'a>) -> Result<Self, Error> {
        let mut drivers = IdVec::with_capacity(graph.node_count());
        for node in graph.nodes() {
            let driver = match resolver.resolve(node.id()) {
                Ok(driver) => Some(driver),
                Err(Error::NoGoverningDriver(_)) => None,
                Err(e) => return Err(e),
            };
            let id: NodeId = drivers.push(driver);
            debug_assert_eq!(id, node.id());
        }
        log::debug!(
            "Indexed drivers of {} nodes",
            graph.node_count().to_string().cyan()
        );
        Ok(Self { graph, drivers })
    }

    /// Get the driver of node `exe_id`, if it has one.
    pub fn driver_of(&self, exe_id: &str) -> Result<Option<&'a GraphNode>, Error> {
        let id = self.graph.node_id(exe_id)?;
        Ok(self.get(id))
    }

    #[inline]
    pub fn get(&self, node: NodeId) -> Option<&'a GraphNode> {
        let graph = self.graph;
        let driver = *self.drivers.get(node);
        driver.map(|driver| graph.get(driver))
    }

    /// Iterate through (node, driver) pairs, in node declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a GraphNode, Option<&'a GraphNode>)> + '_ {
        self.graph.nodes().map(|node| (node, self.get(node.id())))
    }
}
