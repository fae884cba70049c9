//! Mutable R-Tree used while ingesting points.
//!
//! This module provides the growable side of the index:
//! - Arena-backed nodes with parent indices for split propagation
//! - Least-enlargement subtree choice
//! - Pluggable node splitting (see [`crate::split`])
//! - Aggregate id bitmaps kept current on every insert
//!
//! Once built, a tree is turned into the flat byte layout read by
//! [`crate::immutable`].

pub mod rtree_config;
pub mod rtree_constants;
pub mod rtree_types;
mod node_ref;
mod rtree_impl;

pub use node_ref::NodeRef;
pub use rtree_config::{RTreeConfig, RTreeConfigBuilder, SplitKind};
pub use rtree_constants::{DEFAULT_MAX_ENTRIES, DEFAULT_MIN_ENTRIES, MAX_CHILDREN};
pub use rtree_impl::RTree;
pub use rtree_types::{Entry, EntryId, NodeId, SpatialError, SpatialResult};
