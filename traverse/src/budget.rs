use workflow::{Error, Graph, Malformed, NodeId, Path};

/// Upper bounds on the work a single query may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// max number of hop extensions (or node expansions) between two ends of a search,
    /// i.e. without a path being finished.
    pub max_steps: usize,
    /// max number of hops in a single path.
    pub max_path_len: usize,
}

impl Limits {
    /// Default bounds for `graph`. A path visits each node at most once per level it can
    /// be entered on (twice for sub-loop controllers), so it can't be longer than
    /// twice the node count.
    pub fn for_graph(graph: &Graph) -> Self {
        let nodes = graph.node_count() + 1;
        let edges = graph.edge_count() + 1;
        Self {
            max_steps: nodes.saturating_mul(edges),
            max_path_len: graph.node_count().saturating_mul(2).max(1),
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// Counts the steps taken by one query, and fails once the search stops making progress.
///
/// Planners list every path, and there can be exponentially many of them,
/// so the step bound is counted from the last finished path rather than over the whole
/// query. A search that never finishes a path (like the driver resolver) is bounded in total.
#[derive(Debug)]
pub struct StepBudget {
    start: NodeId,
    limits: Limits,
    used: usize,
    since_end: usize,
}

impl StepBudget {
    pub fn new(start: NodeId, limits: Limits) -> Self {
        Self {
            start,
            limits,
            used: 0,
            since_end: 0,
        }
    }

    #[inline]
    pub fn step(&mut self, graph: &Graph) -> Result<(), Error> {
        self.used += 1;
        self.since_end += 1;
        if self.since_end > self.limits.max_steps {
            log::debug!("step limit {} exceeded", self.limits.max_steps);
            return Err(Malformed::StepLimitExceeded {
                start: graph.exe_id(self.start).to_owned(),
                limit: self.limits.max_steps,
            }
            .into());
        }
        Ok(())
    }

    /// Record that a path was finished, whether it was kept or not.
    #[inline]
    pub fn end_path(&mut self) {
        self.since_end = 0;
    }

    pub fn check_len(&self, graph: &Graph, path: &Path) -> Result<(), Error> {
        if path.len() > self.limits.max_path_len {
            return Err(Malformed::PathTooLong {
                start: graph.exe_id(self.start).to_owned(),
                limit: self.limits.max_path_len,
            }
            .into());
        }
        Ok(())
    }

    pub fn used(&self) -> usize {
        self.used
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn start() -> NodeId {
        0usize.into()
    }

    fn limits(max_steps: usize) -> Limits {
        Limits {
            max_steps,
            max_path_len: 2,
        }
    }

    #[test]
    fn test_bound_counts_from_last_path() {
        let graph = Graph::try_from(single_node()).unwrap();
        let mut budget = StepBudget::new(start(), limits(2));
        for _ in 0..10 {
            budget.step(&graph).unwrap();
            budget.step(&graph).unwrap();
            budget.end_path();
        }
        assert_eq!(budget.used(), 20);

        budget.step(&graph).unwrap();
        budget.step(&graph).unwrap();
        assert!(matches!(
            budget.step(&graph),
            Err(Error::MalformedGraph(Malformed::StepLimitExceeded { limit: 2, .. }))
        ));
    }

    #[test]
    fn test_path_len() {
        let graph = Graph::try_from(single_node()).unwrap();
        let budget = StepBudget::new(start(), limits(10));
        let round = workflow::Hop {
            source: start(),
            output: 0usize.into(),
            target: start(),
            input: 0usize.into(),
            edge: 0usize.into(),
        };
        let ok = Path::from_hops(vec![round; 2]).unwrap();
        assert!(budget.check_len(&graph, &ok).is_ok());
        let long = Path::from_hops(vec![round; 3]).unwrap();
        assert!(matches!(
            budget.check_len(&graph, &long),
            Err(Error::MalformedGraph(Malformed::PathTooLong { limit: 2, .. }))
        ));
    }

    fn single_node() -> workflow::WorkflowDescription {
        let mut desc = workflow::WorkflowDescription::default();
        desc.add_node(workflow::NodeDescription::new("only"));
        desc
    }
}
