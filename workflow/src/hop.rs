use crate::{Edge, EdgeId, NodeId, PortIdx};

/// Traversal of a single edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hop {
    pub source: NodeId,
    pub output: PortIdx,
    pub target: NodeId,
    pub input: PortIdx,
    /// edge this hop was produced from, so callers can get at its roles:
    pub edge: EdgeId,
}

impl Hop {
    pub fn new(id: EdgeId, edge: &Edge) -> Self {
        Self {
            source: edge.source,
            output: edge.output,
            target: edge.target,
            input: edge.input,
            edge: id,
        }
    }
}

/// An ordered sequence of hops, where each hop starts at the node the previous one ended at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    hops: Vec<Hop>,
}

impl Path {
    /// Build a path from `hops`, or `None` if they are not continuous.
    pub fn from_hops(hops: Vec<Hop>) -> Option<Self> {
        let path = Self { hops };
        path.is_continuous().then_some(path)
    }

    /// Append `hop`. Panics in debug builds if it doesn't continue from the last hop.
    pub fn push(&mut self, hop: Hop) {
        debug_assert!(
            self.terminus().map_or(true, |t| t == hop.source),
            "discontinuous hop {hop:?} appended to path"
        );
        self.hops.push(hop);
    }

    pub fn pop(&mut self) -> Option<Hop> {
        self.hops.pop()
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn first(&self) -> Option<&Hop> {
        self.hops.first()
    }

    pub fn last(&self) -> Option<&Hop> {
        self.hops.last()
    }

    /// Node the path starts from.
    pub fn origin(&self) -> Option<NodeId> {
        self.first().map(|h| h.source)
    }

    /// Node the path ends at.
    pub fn terminus(&self) -> Option<NodeId> {
        self.last().map(|h| h.target)
    }

    /// True if every hop starts where the previous one ended.
    pub fn is_continuous(&self) -> bool {
        self.hops.windows(2).all(|w| w[0].target == w[1].source)
    }

    /// True if the path is non-empty and ends where it started.
    pub fn is_closed(&self) -> bool {
        match (self.origin(), self.terminus()) {
            (Some(origin), Some(terminus)) => origin == terminus,
            _ => false,
        }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Hop;
    type IntoIter = std::slice::Iter<'a, Hop>;

    fn into_iter(self) -> Self::IntoIter {
        self.hops.iter()
    }
}

/// A continuous path that returns to its own starting node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cycle(Path);

impl Cycle {
    /// Close `path` into a cycle, or `None` if it isn't one.
    pub fn close(path: Path) -> Option<Self> {
        (path.is_continuous() && path.is_closed()).then_some(Self(path))
    }
}

impl std::ops::Deref for Cycle {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.0
    }
}
