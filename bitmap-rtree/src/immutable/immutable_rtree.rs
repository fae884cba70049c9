use std::sync::Arc;

use super::immutable_node::ImmutableNode;
use super::serializer::serialize_into;
use crate::bitmap::Bitmap;
use crate::bound::Bound;
use crate::rtree::rtree_constants::{FORMAT_VERSION, INT_NUM_BYTES, TREE_HEADER_NUM_BYTES};
use crate::rtree::{RTree, SpatialError, SpatialResult};

/// A read-only tree backed by one shared byte buffer.
///
/// Layout: `version: u8`, `num_dims: i32` (big-endian), then the serialized
/// tree with its root at offset [`TREE_HEADER_NUM_BYTES`]. Clones share the
/// buffer.
#[derive(Debug, Clone)]
pub struct ImmutableRTree {
    num_dims: usize,
    data: Arc<[u8]>,
}

impl ImmutableRTree {
    /// A tree with no buffer. Every search yields an empty bitmap.
    pub fn empty() -> Self {
        ImmutableRTree {
            num_dims: 0,
            data: Arc::from(Vec::new()),
        }
    }

    pub fn from_mutable<B: Bitmap>(tree: &RTree<B>) -> SpatialResult<Self> {
        let num_dims = i32::try_from(tree.num_dims()).map_err(|_| {
            SpatialError::InvalidOperation(format!("{} dimensions is too many", tree.num_dims()))
        })?;
        let mut buffer = Vec::new();
        buffer.push(FORMAT_VERSION);
        buffer.extend_from_slice(&num_dims.to_be_bytes());
        serialize_into(tree, &mut buffer)?;

        Ok(ImmutableRTree {
            num_dims: tree.num_dims(),
            data: Arc::from(buffer),
        })
    }

    /// Wraps a buffer previously produced by [`as_bytes`](Self::as_bytes).
    ///
    /// Only the header is checked here; nodes are validated as they are read.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> SpatialResult<Self> {
        let data: Arc<[u8]> = bytes.into();
        if data.is_empty() {
            return Ok(Self::empty());
        }
        if data[0] != FORMAT_VERSION {
            return Err(SpatialError::CorruptIndexFormat(format!(
                "unsupported format version {}",
                data[0]
            )));
        }
        let dims = data
            .get(1..1 + INT_NUM_BYTES)
            .map(|b| i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
            .ok_or_else(|| SpatialError::CorruptIndexFormat("truncated tree header".into()))?;
        let num_dims = usize::try_from(dims)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                SpatialError::CorruptIndexFormat(format!("invalid dimensionality {}", dims))
            })?;
        if data.len() <= TREE_HEADER_NUM_BYTES {
            return Err(SpatialError::CorruptIndexFormat("missing root node".into()));
        }

        let tree = ImmutableRTree { num_dims, data };
        // Fail early on a root that cannot be parsed.
        tree.root()?;
        Ok(tree)
    }

    pub fn num_dims(&self) -> usize {
        self.num_dims
    }

    /// True when the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.root().ok().flatten().is_none()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Root node, or `None` for a tree without points.
    pub fn root(&self) -> SpatialResult<Option<ImmutableNode<'_>>> {
        if self.data.is_empty() {
            return Ok(None);
        }
        let root = ImmutableNode::new(self.num_dims, TREE_HEADER_NUM_BYTES, 0, &self.data)?;
        Ok((root.num_children() > 0).then_some(root))
    }

    /// Collects the ids of every point inside `bound`.
    ///
    /// `B` must be the bitmap type the tree was serialized with.
    pub fn search<B: Bitmap, Q: Bound + ?Sized>(&self, bound: &Q) -> SpatialResult<B> {
        let mut result = B::default();
        let Some(root) = self.root()? else {
            return Ok(result);
        };
        if bound.num_dims() != self.num_dims {
            return Err(SpatialError::DimensionMismatch {
                expected: self.num_dims,
                actual: bound.num_dims(),
            });
        }

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_point() {
                if bound.contains_point(&node.coordinates()?) {
                    result.union_with(&node.bitmap()?);
                }
                continue;
            }
            let min = node.min_coordinates()?;
            let max = node.max_coordinates()?;
            if !bound.overlaps(&min, &max) {
                continue;
            }
            if bound.covers(&min, &max) {
                result.union_with(&node.bitmap()?);
                continue;
            }
            for child in node.children() {
                stack.push(child?);
            }
        }

        log::trace!("search matched {} ids", result.len());
        Ok(result)
    }
}

impl Default for ImmutableRTree {
    fn default() -> Self {
        Self::empty()
    }
}
