//! Control-flow analyses over a [`workflow::Graph`]:
//! which loop driver governs a node, how a failure propagates,
//! and which hops a reset signal takes when a loop restarts.
//!
//! Every query is a pure function of the (immutable) graph,
//! so any number of them can run concurrently on a shared graph.

use std::collections::BTreeMap;

mod budget;
pub use budget::{Limits, StepBudget};

mod rules;

mod stop;
pub use stop::{FailureStop, ParseFailureStopError};

mod resolver;
pub use resolver::DriverResolver;

mod failure;
pub use failure::FailurePlanner;

mod reset;
pub use reset::ResetPlanner;

/// Result of a hop planner: one entry per output of the queried node, keyed by output
/// name. An output that leads nowhere still has its (empty) entry.
pub type HopsPerOutput<T> = BTreeMap<String, Vec<T>>;
