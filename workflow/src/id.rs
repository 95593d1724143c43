//! Ids for use in typed collections.

macro_rules! id {
    ($name:ident, $ty:ty) => {
        #[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name($ty);

        impl From<$name> for usize {
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl From<usize> for $name {
            fn from(val: usize) -> $name {
                Self(val as $ty)
            }
        }
    };
}

// a workflow with more than ~4 billion components or connections is not a thing.
id!(NodeId, u32);
id!(EdgeId, u32);

// index of a port among a node's inputs, or among its outputs.
id!(PortIdx, u16);

impl PortIdx {
    /// Most inputs (and, separately, most outputs) a single node can declare.
    pub const MAX_PORTS: usize = u16::MAX as usize + 1;
}
