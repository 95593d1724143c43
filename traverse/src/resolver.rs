use colored::Colorize;
use std::vec;
use util::HashSet;
use workflow::{EdgeId, Error, Graph, GraphNode, Malformed, NodeId, PortRole};

use crate::budget::{Limits, StepBudget};
use crate::rules::{next_edges, Entry, Walk};

/// Finds the loop driver that governs a node: the driver that handles failures
/// reported by the node, and that resets it when its loop restarts.
#[derive(Debug, Clone, Copy)]
pub struct DriverResolver<'a> {
    graph: &'a Graph,
    limits: Limits,
}

impl<'a> DriverResolver<'a> {
    pub fn new(graph: &'a Graph, limits: Limits) -> Self {
        Self { graph, limits }
    }

    /// Get the driver of the innermost loop that contains node `exe_id`.
    /// For a driver, that is the driver of the loop enclosing it.
    pub fn loop_driver_of(&self, exe_id: &str) -> Result<&'a GraphNode, Error> {
        let start = self.graph.node_id(exe_id)?;
        let driver = self.resolve(start)?;
        Ok(self.graph.get(driver))
    }

    /// Walks forward from `start` until every branch has entered a driver
    /// through a same-level input. All branches must agree on the driver.
    pub fn resolve(&self, start: NodeId) -> Result<NodeId, Error> {
        let graph = self.graph;
        log::trace!("Resolving loop driver of {}", graph.exe_id(start).cyan());

        let mut search = Search {
            graph,
            start,
            budget: StepBudget::new(start, self.limits),
            visited: HashSet::default(),
            on_stack: HashSet::default(),
            found: None,
            looped: false,
        };
        search.run()?;

        match search.found {
            Some(driver) => {
                log::trace!(
                    "Loop driver of {} is {} ({} steps)",
                    graph.exe_id(start).cyan(),
                    graph.exe_id(driver).cyan(),
                    search.budget.used(),
                );
                Ok(driver)
            }
            None if search.looped => {
                Err(Malformed::DriverlessCycle(graph.exe_id(start).to_owned()).into())
            }
            None => Err(Error::NoGoverningDriver(graph.exe_id(start).to_owned())),
        }
    }
}

type State = (NodeId, Entry);

/// Depth-first search over (node, how it was entered) states.
/// A node can be passed through once per role it is entered by.
struct Search<'a> {
    graph: &'a Graph,
    start: NodeId,
    budget: StepBudget,
    visited: HashSet<State>,
    on_stack: HashSet<State>,
    found: Option<NodeId>,
    looped: bool,
}

impl Search<'_> {
    fn run(&mut self) -> Result<(), Error> {
        let graph = self.graph;
        let mut stack = vec![self.enter((self.start, Entry::Start))?];

        while let Some((state, edges)) = stack.last_mut() {
            let Some(id) = edges.next() else {
                let state = *state;
                stack.pop();
                self.on_stack.remove(&state);
                continue;
            };

            let edge = graph.edge(id);
            if edge.target_role == PortRole::Same && graph.get(edge.target).is_driver() {
                self.record(edge.target)?;
                continue;
            }
            let next = (edge.target, Entry::Via(edge.target_role));
            if self.on_stack.contains(&next) {
                self.looped = true;
            } else if !self.visited.contains(&next) {
                stack.push(self.enter(next)?);
            }
        }
        Ok(())
    }

    fn enter(&mut self, state: State) -> Result<(State, vec::IntoIter<EdgeId>), Error> {
        self.budget.step(self.graph)?;
        self.visited.insert(state);
        self.on_stack.insert(state);
        let (node, entry) = state;
        let edges: Vec<EdgeId> = next_edges(self.graph, node, entry, Walk::Exit).collect();
        Ok((state, edges.into_iter()))
    }

    fn record(&mut self, driver: NodeId) -> Result<(), Error> {
        match self.found {
            None => {
                self.found = Some(driver);
                Ok(())
            }
            Some(first) if first == driver => Ok(()),
            Some(first) => Err(Malformed::ConflictingDrivers {
                node: self.graph.exe_id(self.start).to_owned(),
                first: self.graph.exe_id(first).to_owned(),
                second: self.graph.exe_id(driver).to_owned(),
            }
            .into()),
        }
    }
}
