//! RTree implementation.

use roaring::RoaringBitmap;

use super::node_ref::NodeRef;
use super::rtree_config::RTreeConfig;
use super::rtree_types::{Entry, EntryId, Node, NodeId, NodeSlot, SpatialError, SpatialResult};
use crate::bitmap::Bitmap;
use crate::bounding_box::BoundingBox;
use crate::split::SplitStrategy;

/// A growable R-Tree whose nodes carry the union of the ids beneath them.
///
/// Nodes live in an arena owned by the tree. Parent and child links are
/// arena indices, so walking from a leaf back to the root after an insert
/// is a lookup rather than an ownership edge.
///
/// The tree has no internal locking: `insert` takes `&mut self`, and readers
/// borrow it immutably. Serialize it with [`serialize`](crate::serialize)
/// or [`ImmutableRTree::from_mutable`](crate::ImmutableRTree::from_mutable)
/// to share it between threads.
#[derive(Debug)]
pub struct RTree<B: Bitmap = RoaringBitmap> {
    config: RTreeConfig,
    strategy: Box<dyn SplitStrategy>,
    nodes: Vec<NodeSlot<B>>,
    root: NodeId,
    size: u64,
    /// Number of levels; a tree whose root is a leaf has height 1
    height: usize,
}

impl<B: Bitmap> RTree<B> {
    /// Create an empty tree using the split heuristic named by the config.
    pub fn new(config: RTreeConfig) -> SpatialResult<Self> {
        let strategy = config.split().create_strategy();
        Self::with_strategy(config, strategy)
    }

    /// Create an empty tree with a custom split strategy.
    pub fn with_strategy(
        config: RTreeConfig,
        strategy: Box<dyn SplitStrategy>,
    ) -> SpatialResult<Self> {
        config.validate()?;
        let root = NodeSlot::new(config.num_dims(), None, Node::Leaf { entries: Vec::new() });

        Ok(Self {
            config,
            strategy,
            nodes: vec![root],
            root: 0,
            size: 0,
            height: 1,
        })
    }

    pub fn config(&self) -> &RTreeConfig {
        &self.config
    }

    pub fn num_dims(&self) -> usize {
        self.config.num_dims()
    }

    /// Number of inserted entries
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn root(&self) -> NodeRef<'_, B> {
        NodeRef::new(self, self.root)
    }

    /// Looks up a node by arena index.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, B>> {
        (id < self.nodes.len()).then(|| NodeRef::new(self, id))
    }

    pub(crate) fn slot(&self, id: NodeId) -> &NodeSlot<B> {
        &self.nodes[id]
    }

    /// Inserts a point tagged with `id`.
    ///
    /// Duplicate coordinates (and duplicate ids) are kept as distinct entries.
    /// Fails with [`SpatialError::DimensionMismatch`] and leaves the tree
    /// untouched if `coordinates` has the wrong length.
    pub fn insert(&mut self, coordinates: &[f32], id: EntryId) -> SpatialResult<()> {
        if coordinates.len() != self.num_dims() {
            return Err(SpatialError::DimensionMismatch {
                expected: self.num_dims(),
                actual: coordinates.len(),
            });
        }

        let entry = Entry::new(coordinates.to_vec(), id);
        let point = entry.bounding_box();
        let leaf = self.choose_leaf(&point);
        log::trace!("inserting id {} into leaf node {}", id, leaf);

        match &mut self.nodes[leaf].node {
            Node::Leaf { entries } => entries.push(entry),
            Node::Internal { .. } => {
                return Err(SpatialError::InvalidOperation(
                    "Expected leaf node for insertion".into(),
                ))
            }
        }

        // Boxes and bitmaps must be current on the whole path before any split.
        let mut current = Some(leaf);
        while let Some(node_id) = current {
            let slot = &mut self.nodes[node_id];
            slot.bbox.expand(&point);
            slot.bitmap.insert(id);
            current = slot.parent;
        }
        self.size += 1;

        self.adjust_tree(leaf)
    }

    /// Descends from the root into the child needing the least enlargement,
    /// preferring the smaller area on ties.
    fn choose_leaf(&self, bbox: &BoundingBox) -> NodeId {
        let mut current = self.root;
        loop {
            let children = match &self.nodes[current].node {
                Node::Leaf { .. } => return current,
                Node::Internal { children } => children,
            };

            let mut best: Option<(NodeId, f64, f64)> = None;
            for &child in children {
                let child_bbox = &self.nodes[child].bbox;
                let enlargement = child_bbox.enlargement(bbox);
                let area = child_bbox.area();

                let better = match best {
                    None => true,
                    Some((_, best_enlargement, best_area)) => {
                        enlargement < best_enlargement
                            || (enlargement == best_enlargement && area < best_area)
                    }
                };
                if better {
                    best = Some((child, enlargement, area));
                }
            }

            match best {
                Some((child, _, _)) => current = child,
                None => return current,
            }
        }
    }

    /// Splits overflowing nodes from `start` toward the root.
    fn adjust_tree(&mut self, start: NodeId) -> SpatialResult<()> {
        let mut current = start;
        while self.nodes[current].node.len() > self.config.max_entries() {
            let sibling = self.split_node(current)?;

            match self.nodes[current].parent {
                Some(parent) => {
                    self.attach_after(parent, current, sibling);
                    self.recompute(parent);
                    current = parent;
                }
                None => {
                    self.grow_root(current, sibling);
                    break;
                }
            }
        }
        Ok(())
    }

    /// Splits `id` in two. The first group stays in `id`'s slot and the
    /// second moves to a new slot with the same parent, whose index is returned.
    fn split_node(&mut self, id: NodeId) -> SpatialResult<NodeId> {
        let boxes = self.child_boxes(id);
        let partition = self.strategy.split(&boxes, self.config.capacity())?;

        let node = std::mem::replace(
            &mut self.nodes[id].node,
            Node::Leaf { entries: Vec::new() },
        );
        let (first, second) = match node {
            Node::Leaf { entries } => {
                let (first, second) = partition.apply(entries);
                (Node::Leaf { entries: first }, Node::Leaf { entries: second })
            }
            Node::Internal { children } => {
                let (first, second) = partition.apply(children);
                (
                    Node::Internal { children: first },
                    Node::Internal { children: second },
                )
            }
        };

        let parent = self.nodes[id].parent;
        self.nodes[id].node = first;
        let sibling = self.nodes.len();
        self.nodes.push(NodeSlot::new(self.num_dims(), parent, second));

        if let Node::Internal { children } = &self.nodes[sibling].node {
            let moved = children.clone();
            for child in moved {
                self.nodes[child].parent = Some(sibling);
            }
        }

        self.recompute(id);
        self.recompute(sibling);

        log::debug!(
            "split node {} into {} ({} children) and {} ({} children)",
            id,
            id,
            self.nodes[id].node.len(),
            sibling,
            self.nodes[sibling].node.len()
        );
        Ok(sibling)
    }

    fn child_boxes(&self, id: NodeId) -> Vec<BoundingBox> {
        match &self.nodes[id].node {
            Node::Leaf { entries } => entries.iter().map(Entry::bounding_box).collect(),
            Node::Internal { children } => {
                children.iter().map(|&c| self.nodes[c].bbox.clone()).collect()
            }
        }
    }

    /// Places `sibling` right after `existing` among `parent`'s children.
    fn attach_after(&mut self, parent: NodeId, existing: NodeId, sibling: NodeId) {
        if let Node::Internal { children } = &mut self.nodes[parent].node {
            let position = children
                .iter()
                .position(|&c| c == existing)
                .map_or(children.len(), |p| p + 1);
            children.insert(position, sibling);
        }
    }

    /// Replaces the root with a new internal node over the two halves of the old one.
    fn grow_root(&mut self, old_root: NodeId, sibling: NodeId) {
        let new_root = self.nodes.len();
        self.nodes.push(NodeSlot::new(
            self.num_dims(),
            None,
            Node::Internal {
                children: vec![old_root, sibling],
            },
        ));
        self.nodes[old_root].parent = Some(new_root);
        self.nodes[sibling].parent = Some(new_root);
        self.recompute(new_root);

        self.root = new_root;
        self.height += 1;
        log::debug!("root split, tree height is now {}", self.height);
    }

    /// Rebuilds a node's box and bitmap from its children.
    fn recompute(&mut self, id: NodeId) {
        let mut bbox = BoundingBox::empty(self.num_dims());
        let mut bitmap = B::default();

        match &self.nodes[id].node {
            Node::Leaf { entries } => {
                for entry in entries {
                    bbox.expand_point(entry.coordinates());
                    bitmap.insert(entry.id());
                }
            }
            Node::Internal { children } => {
                for &child in children {
                    bbox.expand(&self.nodes[child].bbox);
                    bitmap.union_with(&self.nodes[child].bitmap);
                }
            }
        }

        let slot = &mut self.nodes[id];
        slot.bbox = bbox;
        slot.bitmap = bitmap;
    }
}
