//! # Bitmap R-Tree - Multidimensional Point Index with Aggregate Id Sets
//!
//! This crate provides an R-Tree over `f32` points in any number of
//! dimensions. Every node carries the set of ids stored beneath it, so a
//! query region that fully covers a node is answered from that node's bitmap
//! without visiting its subtree.
//!
//! ## Features
//!
//! - **Mutable Ingestion**: Least-enlargement insertion with bottom-up splits
//! - **Pluggable Splits**: Linear (default) and quadratic heuristics, or your own
//! - **Aggregate Bitmaps**: Roaring bitmaps by default, any [`Bitmap`] implementation
//! - **Flat Binary Layout**: Big-endian, pre-order, offsets relative to the tree start
//! - **Zero-Copy Reads**: [`ImmutableNode`] decodes nodes in place from a byte slice
//! - **Bound Search**: Rectangular and radius queries over the immutable form
//!
//! ## Quick Start
//!
//! ```rust
//! use bitmap_rtree::{ImmutableRTree, RTree, RTreeConfig, RectangularBound};
//! use roaring::RoaringBitmap;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RTreeConfig::builder(2).max_entries(8).build()?;
//! let mut tree: RTree = RTree::new(config)?;
//! for id in 0..100u32 {
//!     tree.insert(&[(id % 10) as f32, (id / 10) as f32], id)?;
//! }
//!
//! let immutable = ImmutableRTree::from_mutable(&tree)?;
//! let bound = RectangularBound::new(vec![0.0, 0.0], vec![1.0, 1.0])?;
//! let ids: RoaringBitmap = immutable.search(&bound)?;
//! assert_eq!(ids.iter().collect::<Vec<_>>(), vec![0, 1, 10, 11]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Reading Nodes Directly
//!
//! ```rust
//! use bitmap_rtree::{serialize, ImmutableNode, RTree, RTreeConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tree: RTree = RTree::new(RTreeConfig::new(2))?;
//! tree.insert(&[1.0, 2.0], 7)?;
//!
//! let bytes = serialize(&tree)?;
//! let root = ImmutableNode::new(2, 0, 0, &bytes)?;
//! let point = root.child(0)?;
//! assert!(point.is_point());
//! assert_eq!(point.coordinates()?, vec![1.0, 2.0]);
//! # Ok(())
//! # }
//! ```

// Core R-Tree modules
pub mod bitmap;
pub mod bounding_box;
pub mod rtree;
pub mod split;

// Read-only modules
pub mod bound;
pub mod immutable;

// Re-export R-Tree types
pub use bitmap::Bitmap;
pub use bounding_box::BoundingBox;
pub use rtree::{
    Entry, EntryId, NodeId, NodeRef, RTree, RTreeConfig, RTreeConfigBuilder, SpatialError,
    SpatialResult, SplitKind,
};

// Re-export split strategies
pub use split::{
    LinearSplitStrategy, NodeCapacity, QuadraticSplitStrategy, SplitPartition, SplitStrategy,
};

// Re-export immutable types
pub use bound::{Bound, RadiusBound, RectangularBound};
pub use immutable::{serialize, ImmutableChildren, ImmutableNode, ImmutableRTree};
