//! Control-flow analysis for workflows with nested loops.
//!
//! A [`WorkflowGraph`] is built once per workflow run from its static
//! [`WorkflowDescription`], and answers three questions for the execution runtime:
//! which loop driver governs a node ([`WorkflowGraph::loop_driver_of`]),
//! how a failure is propagated ([`WorkflowGraph::hops_on_failure`]),
//! and which back-edges are reset when a loop restarts ([`WorkflowGraph::hops_on_reset`]).
//!
//! The graph is never mutated after construction, so it can be shared between threads
//! and queried concurrently.

/// Graphviz output
mod dot;
/// Up-front driver resolution for every node
mod index;
/// Analysis settings
mod settings;

pub use index::DriverIndex;
pub use settings::{Error as SettingsError, Settings};

pub use traverse::{FailureStop, HopsPerOutput, Limits};
pub use workflow::{
    Cycle, Edge, Endpoint, Error, Graph, GraphNode, Hop, Malformed, NodeDescription, NodeId,
    Path, PortRole, WorkflowDescription,
};

use colored::Colorize;
use traverse::{DriverResolver, FailurePlanner, ResetPlanner};

/// A validated workflow graph, plus the settings its analyses run with.
#[derive(Debug)]
pub struct WorkflowGraph {
    graph: Graph,
    settings: Settings,
}

impl WorkflowGraph {
    /// Validate `desc` and build its graph.
    pub fn new(desc: WorkflowDescription, settings: Settings) -> Result<Self, Error> {
        let graph = Graph::try_from(desc)?;
        log::debug!(
            "Analysis settings: failure stop at {}, dedup targets {}, max steps {}",
            settings.failure_stop.to_string().cyan(),
            settings.dedup_failure_targets,
            match settings.max_steps {
                Some(n) => n.to_string(),
                None => format!("{} (auto)", settings.limits(&graph).max_steps),
            },
        );
        Ok(Self { graph, settings })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the node declared with execution identifier `exe_id`.
    pub fn node(&self, exe_id: &str) -> Result<&GraphNode, Error> {
        self.graph.node(exe_id)
    }

    /// Edges leaving output `port_id` of node `exe_id`; empty if the output is unconnected.
    pub fn outgoing_edges(
        &self,
        exe_id: &str,
        port_id: &str,
    ) -> Result<impl Iterator<Item = &Edge> + '_, Error> {
        self.graph.outgoing_edges(exe_id, port_id)
    }

    fn resolver(&self) -> DriverResolver<'_> {
        DriverResolver::new(&self.graph, self.settings.limits(&self.graph))
    }

    /// Get the driver of the innermost loop containing node `exe_id`.
    /// A driver resolves to the driver of the loop around its own.
    pub fn loop_driver_of(&self, exe_id: &str) -> Result<&GraphNode, Error> {
        self.resolver().loop_driver_of(exe_id)
    }

    /// Get, for each output of node `exe_id`, the paths along which
    /// a failure of that node is reported to its consumers.
    pub fn hops_on_failure(&self, exe_id: &str) -> Result<HopsPerOutput<Path>, Error> {
        FailurePlanner::new(&self.graph, self.settings.limits(&self.graph))
            .stop_at(self.settings.failure_stop)
            .dedup_targets(self.settings.dedup_failure_targets)
            .hops_on_failure(exe_id)
    }

    /// Get, for each output of driver `exe_id`, the cycles a reset of its loop walks.
    pub fn hops_on_reset(&self, exe_id: &str) -> Result<HopsPerOutput<Cycle>, Error> {
        ResetPlanner::new(&self.graph, self.settings.limits(&self.graph)).hops_on_reset(exe_id)
    }

    /// Resolve the governing driver of every node at once.
    pub fn driver_index(&self) -> Result<DriverIndex<'_>, Error> {
        DriverIndex::build(&self.graph, self.resolver())
    }

    /// Render the graph as a Graphviz `digraph`.
    pub fn to_dot(&self) -> String {
        let mut out = String::with_capacity(64 * (self.graph.node_count() + self.graph.edge_count()));
        // writing to a String can't fail.
        let _ = dot::write_dot(&self.graph, &mut out);
        out
    }
}

impl TryFrom<WorkflowDescription> for WorkflowGraph {
    type Error = Error;
    fn try_from(desc: WorkflowDescription) -> Result<Self, Self::Error> {
        Self::new(desc, Settings::default())
    }
}
