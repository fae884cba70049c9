use std::fmt;

use super::rtree_impl::RTree;
use super::rtree_types::{Entry, Node, NodeId};
use crate::bitmap::Bitmap;
use crate::bounding_box::BoundingBox;

/// Read-only handle to a node of a mutable [`RTree`].
pub struct NodeRef<'a, B: Bitmap> {
    tree: &'a RTree<B>,
    id: NodeId,
}

impl<B: Bitmap> Clone for NodeRef<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: Bitmap> Copy for NodeRef<'_, B> {}

impl<B: Bitmap> fmt::Debug for NodeRef<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("is_leaf", &self.is_leaf())
            .field("len", &self.len())
            .field("bbox", self.bounding_box())
            .finish()
    }
}

impl<'a, B: Bitmap> NodeRef<'a, B> {
    pub(crate) fn new(tree: &'a RTree<B>, id: NodeId) -> Self {
        Self { tree, id }
    }

    /// Arena index of this node
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_leaf(&self) -> bool {
        self.tree.slot(self.id).node.is_leaf()
    }

    /// Number of children (entries for a leaf, nodes otherwise)
    pub fn len(&self) -> usize {
        self.tree.slot(self.id).node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bounding_box(&self) -> &'a BoundingBox {
        &self.tree.slot(self.id).bbox
    }

    pub fn min_coordinates(&self) -> &'a [f32] {
        self.bounding_box().min()
    }

    pub fn max_coordinates(&self) -> &'a [f32] {
        self.bounding_box().max()
    }

    /// Product over all dimensions of `max[i] - min[i]`
    pub fn area(&self) -> f64 {
        self.bounding_box().area()
    }

    /// Union of the ids of every entry beneath this node
    pub fn bitmap(&self) -> &'a B {
        &self.tree.slot(self.id).bitmap
    }

    /// Entries of a leaf; empty for an internal node.
    pub fn entries(&self) -> &'a [Entry] {
        match &self.tree.slot(self.id).node {
            Node::Leaf { entries } => entries,
            Node::Internal { .. } => &[],
        }
    }

    /// Child nodes of an internal node; empty for a leaf.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a, B>> + 'a {
        let tree = self.tree;
        let children: &'a [NodeId] = match &tree.slot(self.id).node {
            Node::Internal { children } => children,
            Node::Leaf { .. } => &[],
        };
        children.iter().map(move |&id| NodeRef::new(tree, id))
    }

    pub fn parent(&self) -> Option<NodeRef<'a, B>> {
        self.tree
            .slot(self.id)
            .parent
            .map(|id| NodeRef::new(self.tree, id))
    }
}
