//! Graph model for workflow control-flow analysis.
//!
//! A [`Graph`] is built once from a [`WorkflowDescription`] and is read-only afterwards.
//! Loop structure is carried entirely by the [`PortRole`] on each end of each [`Edge`];
//! the only per-node flag is whether the node is a loop driver.

mod id;
pub use id::{EdgeId, NodeId, PortIdx};

mod role;
pub use role::{ParseRoleError, PortRole};

mod node;
pub use node::{GraphNode, Port};

mod edge;
pub use edge::Edge;

mod hop;
pub use hop::{Cycle, Hop, Path};

mod description;
pub use description::{ConnectionDescription, Endpoint, NodeDescription, WorkflowDescription};

mod error;
pub use error::{Direction, Error, Errors, Malformed};

mod graph;
pub use graph::{Graph, HopDisplay, PathDisplay};
