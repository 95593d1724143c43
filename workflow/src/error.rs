use std::fmt;

use colored::Colorize;

/// Errors surfaced to callers of the graph model and the analyses built on it.
/// All of them are deterministic functions of the static graph, so none are retryable.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Node not found: '{0}'")]
    NodeNotFound(String),
    #[error("Node '{node}' has no output port '{port}'")]
    PortNotFound { node: String, port: String },
    #[error("Malformed workflow graph: {0}")]
    MalformedGraph(#[from] Malformed),
    #[error("No governing loop driver found for node '{0}'")]
    NoGoverningDriver(String),
    #[error("Node '{0}' is not a loop driver")]
    NotALoopDriver(String),
}

/// Which side of a node a port was looked up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// Ways in which a workflow graph can be invalid,
/// detected either while building it or while traversing it.
#[derive(Debug, thiserror::Error)]
pub enum Malformed {
    #[error("node '{0}' is declared more than once")]
    DuplicateNode(String),
    #[error("node '{node}' declares port '{port}' more than once")]
    DuplicatePort { node: String, port: String },
    #[error("node '{node}' declares {count} {direction} ports, more than a node can have")]
    TooManyPorts {
        node: String,
        direction: Direction,
        count: usize,
    },
    #[error("node '{node}' has more than one output named '{name}'")]
    DuplicateOutputName { node: String, name: String },
    #[error("edge {edge} references unknown node '{node}'")]
    DanglingNode { edge: String, node: String },
    #[error("edge {edge} references undeclared {direction} port '{port}' of node '{node}'")]
    DanglingPort {
        edge: String,
        node: String,
        port: String,
        direction: Direction,
    },
    #[error("traversal from '{start}' exceeded its bound of {limit} steps")]
    StepLimitExceeded { start: String, limit: usize },
    #[error("path from '{start}' grew past {limit} hops without ending")]
    PathTooLong { start: String, limit: usize },
    #[error("loop exit walk from '{0}' runs in a cycle without reaching a driver")]
    DriverlessCycle(String),
    #[error("node '{node}' resolves to conflicting drivers '{first}' and '{second}'")]
    ConflictingDrivers {
        node: String,
        first: String,
        second: String,
    },
    #[error("{first} (and {more} more)")]
    Aggregated { first: Box<Malformed>, more: usize },
}

/// Collects every problem found while validating a graph,
/// so they can all be reported before construction fails.
#[derive(Debug)]
pub struct Errors {
    errors: Vec<Malformed>,
}

impl Default for Errors {
    fn default() -> Self {
        Self {
            // ideally we won't have any,
            // and we don't mind reallocating if we're already in an error state:
            errors: Vec::with_capacity(0),
        }
    }
}

impl Errors {
    pub fn add(&mut self, e: Malformed) {
        log::trace!("validation error: {e}");
        self.errors.push(e);
    }

    /// Log the full list of errors, and fail with the first one
    /// if there were one or more.
    pub fn finish(self, label: &str) -> Result<(), Error> {
        let mut errors = self.errors.into_iter();
        let Some(first) = errors.next() else {
            return Ok(());
        };
        let more = errors.len();

        log::error!("{} {}:", "Encountered errors while".red(), label.red());
        log::error!("{}: {first}", "ERROR".red());
        for e in errors {
            log::error!("{}: {e}", "ERROR".red());
        }

        let e = if more == 0 {
            first
        } else {
            Malformed::Aggregated {
                first: Box::new(first),
                more,
            }
        };
        Err(e.into())
    }
}
