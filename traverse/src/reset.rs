use colored::Colorize;
use std::collections::BTreeMap;
use util::HashSet;
use workflow::{Cycle, EdgeId, Error, Graph, Hop, NodeId, Path, PortRole};

use crate::budget::{Limits, StepBudget};
use crate::rules::{next_edges, start_edges, Entry, Walk};
use crate::HopsPerOutput;

/// Plans the hops a reset signal takes when a loop driver restarts its loop.
#[derive(Debug, Clone, Copy)]
pub struct ResetPlanner<'a> {
    graph: &'a Graph,
    limits: Limits,
}

impl<'a> ResetPlanner<'a> {
    pub fn new(graph: &'a Graph, limits: Limits) -> Self {
        Self { graph, limits }
    }

    /// Get, for each output of driver `exe_id`, every cycle that leaves through
    /// that output and comes back to the driver through a same-level input.
    pub fn hops_on_reset(&self, exe_id: &str) -> Result<HopsPerOutput<Cycle>, Error> {
        let driver = self.graph.node_id(exe_id)?;
        self.plan(driver)
    }

    pub fn plan(&self, driver: NodeId) -> Result<HopsPerOutput<Cycle>, Error> {
        let graph = self.graph;
        let node = graph.get(driver);
        if !node.is_driver() {
            return Err(Error::NotALoopDriver(node.exe_id().to_owned()));
        }
        log::debug!("Planning reset hops from {}", node.exe_id().cyan());

        let mut walk = ResetWalk {
            graph,
            driver,
            budget: StepBudget::new(driver, self.limits),
            path: Path::default(),
            on_path: HashSet::default(),
            cycles: Vec::new(),
        };

        let mut hops = BTreeMap::new();
        for output in node.output_idxs() {
            let first = start_edges(graph, driver, output, Walk::Reset).collect();
            walk.run(first)?;
            hops.insert(
                node.output(output).name.clone(),
                std::mem::take(&mut walk.cycles),
            );
        }

        log::debug!(
            "Found {} reset cycles from {} ({} steps)",
            hops.values().map(Vec::len).sum::<usize>(),
            node.exe_id().cyan(),
            walk.budget.used(),
        );
        Ok(hops)
    }
}

struct ResetWalk<'a> {
    graph: &'a Graph,
    driver: NodeId,
    budget: StepBudget,
    path: Path,
    /// nodes on the current path, other than the driver.
    on_path: HashSet<NodeId>,
    cycles: Vec<Cycle>,
}

impl ResetWalk<'_> {
    /// Walk every path that starts with one of the edges in `first`,
    /// keeping those that come back to the driver.
    fn run(&mut self, first: Vec<EdgeId>) -> Result<(), Error> {
        let graph = self.graph;
        let mut stack = vec![(self.driver, first.into_iter())];

        while let Some((node, pending)) = stack.last_mut() {
            let Some(id) = pending.next() else {
                let node = *node;
                stack.pop();
                if !stack.is_empty() {
                    self.on_path.remove(&node);
                    self.path.pop();
                }
                continue;
            };

            self.budget.step(graph)?;
            let edge = *graph.edge(id);
            self.path.push(Hop::new(id, &edge));
            self.budget.check_len(graph, &self.path)?;

            if edge.target == self.driver {
                // coming back in through an outer input is not a loop-back.
                if edge.target_role == PortRole::Same {
                    if let Some(cycle) = Cycle::close(self.path.clone()) {
                        log::trace!("reset cycle {}", graph.display_path(&cycle));
                        self.cycles.push(cycle);
                    }
                }
            } else if self.on_path.insert(edge.target) {
                let next: Vec<EdgeId> =
                    next_edges(graph, edge.target, Entry::Via(edge.target_role), Walk::Reset)
                        .filter(|next| !self.on_path.contains(&graph.edge(*next).target))
                        .collect();
                if !next.is_empty() {
                    stack.push((edge.target, next.into_iter()));
                    continue;
                }
                self.on_path.remove(&edge.target);
            }

            self.budget.end_path();
            self.path.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::Result;
    use workflow::{Endpoint, NodeDescription, WorkflowDescription};

    fn node(exe_id: &str) -> NodeDescription {
        NodeDescription::new(exe_id)
            .input(format!("{exe_id}-in"), "inp_0")
            .output(format!("{exe_id}-out"), "out_0")
    }

    fn connect(desc: &mut WorkflowDescription, from: &str, out: PortRole, to: &str, inp: PortRole) {
        desc.connect(
            Endpoint::new(from, format!("{from}-out"), out),
            Endpoint::new(to, format!("{to}-in"), inp),
        );
    }

    #[test]
    fn test_single_cycle() -> Result<()> {
        let mut desc = WorkflowDescription::default();
        desc.add_node(node("drv").driver()).add_node(node("a")).add_node(node("b"));
        connect(&mut desc, "drv", PortRole::Same, "a", PortRole::Same);
        connect(&mut desc, "a", PortRole::Same, "b", PortRole::Same);
        connect(&mut desc, "b", PortRole::Same, "drv", PortRole::Same);
        let g = Graph::try_from(desc)?;

        let hops = ResetPlanner::new(&g, Limits::for_graph(&g)).hops_on_reset("drv")?;
        assert_eq!(hops.len(), 1);
        let cycles = &hops["out_0"];
        assert_eq!(cycles.len(), 1);
        assert_eq!(
            g.display_path(&cycles[0]).to_string(),
            "[drv:out_0 -> a:inp_0, a:out_0 -> b:inp_0, b:out_0 -> drv:inp_0]"
        );
        assert!(cycles[0].is_closed());
        Ok(())
    }

    #[test]
    fn test_branches_fan_out() -> Result<()> {
        let mut desc = WorkflowDescription::default();
        desc.add_node(node("drv").driver())
            .add_node(node("a"))
            .add_node(node("b"))
            .add_node(node("c"));
        connect(&mut desc, "drv", PortRole::Same, "a", PortRole::Same);
        connect(&mut desc, "a", PortRole::Same, "b", PortRole::Same);
        connect(&mut desc, "a", PortRole::Same, "c", PortRole::Same);
        connect(&mut desc, "b", PortRole::Same, "drv", PortRole::Same);
        connect(&mut desc, "c", PortRole::Same, "drv", PortRole::Same);
        let g = Graph::try_from(desc)?;

        let hops = ResetPlanner::new(&g, Limits::for_graph(&g)).hops_on_reset("drv")?;
        let ends: Vec<_> = hops["out_0"]
            .iter()
            .map(|c| g.exe_id(c.hops()[1].target))
            .collect();
        assert_eq!(ends, ["b", "c"]);
        Ok(())
    }

    #[test]
    fn test_open_branch_dropped() -> Result<()> {
        let mut desc = WorkflowDescription::default();
        desc.add_node(node("drv").driver()).add_node(node("a"));
        connect(&mut desc, "drv", PortRole::Same, "a", PortRole::Same);
        connect(&mut desc, "drv", PortRole::Outer, "a", PortRole::Same);
        let g = Graph::try_from(desc)?;

        let hops = ResetPlanner::new(&g, Limits::for_graph(&g)).hops_on_reset("drv")?;
        assert!(hops["out_0"].is_empty());
        Ok(())
    }

    #[test]
    fn test_not_a_driver() -> Result<()> {
        let mut desc = WorkflowDescription::default();
        desc.add_node(node("a"));
        let g = Graph::try_from(desc)?;

        let planner = ResetPlanner::new(&g, Limits::for_graph(&g));
        assert!(matches!(
            planner.hops_on_reset("a"),
            Err(Error::NotALoopDriver(id)) if id == "a"
        ));
        Ok(())
    }
}
