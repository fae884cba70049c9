//! Read-only form of the tree.
//!
//! A mutable [`RTree`](crate::RTree) is flattened by [`serialize`] into one
//! contiguous big-endian buffer. [`ImmutableNode`] reads nodes straight out
//! of that buffer without copying it, and [`ImmutableRTree`] owns a shared
//! buffer with a small header and answers bound searches.

mod immutable_node;
mod immutable_rtree;
mod serializer;

pub use immutable_node::{ImmutableChildren, ImmutableNode};
pub use immutable_rtree::ImmutableRTree;
pub use serializer::{serialize, serialize_into};
