//! Core types shared by the mutable and immutable R-Tree representations:
//! - Error and result types
//! - Leaf entries
//! - Arena node types

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bounding_box::BoundingBox;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while building or reading a spatial index
#[derive(Debug, Error)]
pub enum SpatialError {
    /// A coordinate vector does not match the tree's dimensionality.
    #[error("Dimension mismatch: expected {expected} coordinates, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A node was split without being exactly one child over capacity.
    #[error("Invalid split input: expected {expected} children, got {actual}")]
    InvalidSplitInput { expected: usize, actual: usize },

    /// A serialized index violates the byte layout.
    #[error("Corrupt index format: {0}")]
    CorruptIndexFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for spatial operations
pub type SpatialResult<T> = Result<T, SpatialError>;

/// Identifier attached to every inserted point
pub type EntryId = u32;

/// Index of a node inside the tree's arena
pub type NodeId = usize;

// ============================================================================
// Entries
// ============================================================================

/// A point inserted into the tree: one coordinate per dimension plus an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    coordinates: Vec<f32>,
    id: EntryId,
}

impl Entry {
    pub fn new(coordinates: Vec<f32>, id: EntryId) -> Self {
        Self { coordinates, id }
    }

    pub fn coordinates(&self) -> &[f32] {
        &self.coordinates
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Degenerate box covering just this point.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::point(&self.coordinates)
    }
}

// ============================================================================
// Node Types
// ============================================================================

/// Children of an arena node
#[derive(Debug, Clone)]
pub(crate) enum Node {
    /// Leaf node holding the inserted points
    Leaf { entries: Vec<Entry> },
    /// Internal node holding arena indices of its children
    Internal { children: Vec<NodeId> },
}

impl Node {
    pub(crate) fn len(&self) -> usize {
        match self {
            Node::Leaf { entries } => entries.len(),
            Node::Internal { children } => children.len(),
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

/// One arena slot: a node together with its MBR, aggregate bitmap and the
/// index of its parent (`None` for the root).
#[derive(Debug, Clone)]
pub(crate) struct NodeSlot<B> {
    pub(crate) bbox: BoundingBox,
    pub(crate) bitmap: B,
    pub(crate) parent: Option<NodeId>,
    pub(crate) node: Node,
}

impl<B: Default> NodeSlot<B> {
    pub(crate) fn new(num_dims: usize, parent: Option<NodeId>, node: Node) -> Self {
        Self {
            bbox: BoundingBox::empty(num_dims),
            bitmap: B::default(),
            parent,
            node,
        }
    }
}
