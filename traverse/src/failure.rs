use colored::Colorize;
use std::collections::BTreeMap;
use util::HashSet;
use workflow::{Edge, EdgeId, Error, Graph, Hop, NodeId, Path, PortIdx, PortRole};

use crate::budget::{Limits, StepBudget};
use crate::rules::{next_edges, start_edges, Entry, Walk};
use crate::stop::FailureStop;
use crate::HopsPerOutput;

/// Plans how a failure in one node is propagated through the graph.
#[derive(Debug, Clone, Copy)]
pub struct FailurePlanner<'a> {
    graph: &'a Graph,
    limits: Limits,
    stop: FailureStop,
    dedup_targets: bool,
}

impl<'a> FailurePlanner<'a> {
    pub fn new(graph: &'a Graph, limits: Limits) -> Self {
        Self {
            graph,
            limits,
            stop: FailureStop::default(),
            dedup_targets: false,
        }
    }

    pub fn stop_at(mut self, stop: FailureStop) -> Self {
        self.stop = stop;
        self
    }

    /// If set, a path whose final hop lands on an input already reached by an earlier
    /// path (in output declaration order) is dropped. Outputs keep their entry regardless.
    pub fn dedup_targets(mut self, dedup: bool) -> Self {
        self.dedup_targets = dedup;
        self
    }

    /// Get, for each output of node `exe_id`, every path a failure notification
    /// takes from that output to a node that ends its propagation.
    pub fn hops_on_failure(&self, exe_id: &str) -> Result<HopsPerOutput<Path>, Error> {
        let start = self.graph.node_id(exe_id)?;
        self.plan(start)
    }

    pub fn plan(&self, start: NodeId) -> Result<HopsPerOutput<Path>, Error> {
        let graph = self.graph;
        let node = graph.get(start);
        log::debug!(
            "Planning failure hops from {} (stop at {})",
            node.exe_id().cyan(),
            self.stop,
        );

        let mut walk = FailureWalk {
            graph,
            walk: match self.stop {
                FailureStop::AtGoverningDriver => Walk::Exit,
                FailureStop::AtSink => Walk::Flow,
            },
            budget: StepBudget::new(start, self.limits),
            path: Path::default(),
            on_path: HashSet::default(),
            paths: Vec::new(),
        };

        let mut reached: HashSet<(NodeId, PortIdx)> = HashSet::default();
        let mut hops = BTreeMap::new();
        for output in node.output_idxs() {
            let first = start_edges(graph, start, output, walk.walk).collect();
            walk.run(start, first)?;
            let mut paths = std::mem::take(&mut walk.paths);
            if self.dedup_targets {
                paths.retain(|path| match path.last() {
                    Some(hop) => reached.insert((hop.target, hop.input)),
                    None => true,
                });
            }
            hops.insert(node.output(output).name.clone(), paths);
        }

        log::debug!(
            "Found {} failure paths from {} ({} steps)",
            hops.values().map(Vec::len).sum::<usize>(),
            node.exe_id().cyan(),
            walk.budget.used(),
        );
        Ok(hops)
    }
}

/// Where a walk has been on its current path. Sub-loop controllers are tracked
/// per entry role, since an exit walk can pass them once on each level.
type Visit = (NodeId, Option<PortRole>);

struct FailureWalk<'a> {
    graph: &'a Graph,
    walk: Walk,
    budget: StepBudget,
    path: Path,
    on_path: HashSet<Visit>,
    paths: Vec<Path>,
}

impl FailureWalk<'_> {
    fn visit(&self, node: NodeId, via: PortRole) -> Visit {
        if self.walk == Walk::Exit && self.graph.is_sub_loop_controller(node) {
            (node, Some(via))
        } else {
            (node, None)
        }
    }

    fn ends_at(&self, edge: &Edge) -> bool {
        self.walk == Walk::Exit
            && edge.target_role == PortRole::Same
            && self.graph.get(edge.target).is_driver()
    }

    /// Edges out of `edge`'s target that don't lead back onto the current path.
    fn followable(&self, edge: &Edge) -> Vec<EdgeId> {
        let graph = self.graph;
        next_edges(graph, edge.target, Entry::Via(edge.target_role), self.walk)
            .filter(|next| {
                let next = graph.edge(*next);
                !self.on_path.contains(&self.visit(next.target, next.target_role))
            })
            .collect()
    }

    /// Walk every path that starts with one of the edges in `first`.
    /// Each stack frame holds the edges still to be taken from one node on the path.
    fn run(&mut self, start: NodeId, first: Vec<EdgeId>) -> Result<(), Error> {
        let graph = self.graph;
        let root = (start, None);
        self.on_path.insert(root);
        let mut stack = vec![(root, first.into_iter())];

        while let Some((visit, pending)) = stack.last_mut() {
            let Some(id) = pending.next() else {
                let visit = *visit;
                stack.pop();
                self.on_path.remove(&visit);
                if !stack.is_empty() {
                    self.path.pop();
                }
                continue;
            };

            self.budget.step(graph)?;
            let edge = *graph.edge(id);
            self.path.push(Hop::new(id, &edge));
            self.budget.check_len(graph, &self.path)?;

            // a node with nothing left to follow ends the path.
            let visit = self.visit(edge.target, edge.target_role);
            if !self.ends_at(&edge) && self.on_path.insert(visit) {
                let next = self.followable(&edge);
                if !next.is_empty() {
                    stack.push((visit, next.into_iter()));
                    continue;
                }
                self.on_path.remove(&visit);
            }

            log::trace!("failure path {}", graph.display_path(&self.path));
            self.paths.push(self.path.clone());
            self.budget.end_path();
            self.path.pop();
        }
        Ok(())
    }
}
