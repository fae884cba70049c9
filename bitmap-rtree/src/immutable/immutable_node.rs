use std::iter::FusedIterator;

use crate::bitmap::Bitmap;
use crate::bounding_box::BoundingBox;
use crate::rtree::rtree_constants::{
    CHILD_COUNT_MASK, FLOAT_NUM_BYTES, HEADER_NUM_BYTES, INT_NUM_BYTES, LEAF_FLAG,
};
use crate::rtree::{SpatialError, SpatialResult};

/// A node read in place from a serialized tree.
///
/// Only the header is decoded on construction. Coordinates, the bitmap and
/// child offsets are read from the borrowed buffer on demand, so creating a
/// node never copies the tree.
///
/// `initial_offset` is where the tree starts inside `data`. The node itself
/// starts at `initial_offset + offset_from_initial`, and every child offset
/// stored in the buffer is relative to `initial_offset`.
#[derive(Debug, Clone, Copy)]
pub struct ImmutableNode<'a> {
    num_dims: usize,
    initial_offset: usize,
    offset_from_initial: usize,
    num_children: usize,
    is_leaf: bool,
    data: &'a [u8],
}

impl<'a> ImmutableNode<'a> {
    /// Parses the header of the node at `initial_offset + offset_from_initial`.
    pub fn new(
        num_dims: usize,
        initial_offset: usize,
        offset_from_initial: usize,
        data: &'a [u8],
    ) -> SpatialResult<Self> {
        // Both coordinate arrays must be addressable.
        if num_dims.checked_mul(2 * FLOAT_NUM_BYTES).is_none() {
            return Err(SpatialError::CorruptIndexFormat(format!(
                "{} dimensions do not fit the node layout",
                num_dims
            )));
        }
        let start = initial_offset.saturating_add(offset_from_initial);
        let header = read_u16(data, start)?;
        let node = ImmutableNode {
            num_dims,
            initial_offset,
            offset_from_initial,
            num_children: usize::from(header & CHILD_COUNT_MASK),
            is_leaf: header & LEAF_FLAG != 0,
            data,
        };
        // The fixed-size part must fit before anything else is read from it.
        node.slice(start, node.bitmap_size_offset() + INT_NUM_BYTES - start)?;
        Ok(node)
    }

    pub fn num_dims(&self) -> usize {
        self.num_dims
    }

    /// Offset of this node relative to the start of the tree
    pub fn offset_from_initial(&self) -> usize {
        self.offset_from_initial
    }

    /// Number of child nodes, 0 for a point
    pub fn num_children(&self) -> usize {
        self.num_children
    }

    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// A point is a leaf-flagged node without children; its min and max
    /// coordinates are both the point itself.
    pub fn is_point(&self) -> bool {
        self.is_leaf && self.num_children == 0
    }

    pub fn min_coordinates(&self) -> SpatialResult<Vec<f32>> {
        self.read_coordinates(self.start() + HEADER_NUM_BYTES)
    }

    pub fn max_coordinates(&self) -> SpatialResult<Vec<f32>> {
        self.read_coordinates(self.start() + HEADER_NUM_BYTES + self.coordinates_len())
    }

    /// Same as [`min_coordinates`](Self::min_coordinates); meaningful for points.
    pub fn coordinates(&self) -> SpatialResult<Vec<f32>> {
        self.min_coordinates()
    }

    pub fn bounding_box(&self) -> SpatialResult<BoundingBox> {
        Ok(BoundingBox::new(self.min_coordinates()?, self.max_coordinates()?))
    }

    /// Raw bytes of the aggregate bitmap, borrowed from the buffer.
    pub fn bitmap_bytes(&self) -> SpatialResult<&'a [u8]> {
        let size_offset = self.bitmap_size_offset();
        let size = self.bitmap_size()?;
        self.slice(size_offset + INT_NUM_BYTES, size)
    }

    /// Decodes the aggregate bitmap of this node.
    pub fn bitmap<B: Bitmap>(&self) -> SpatialResult<B> {
        B::from_bytes(self.bitmap_bytes()?)
    }

    /// Returns the child at `index`.
    pub fn child(&self, index: usize) -> SpatialResult<ImmutableNode<'a>> {
        if index >= self.num_children {
            return Err(SpatialError::InvalidOperation(format!(
                "child index {} out of range for node with {} children",
                index, self.num_children
            )));
        }
        let table = self.child_table_offset()?;
        let offset = read_i32(self.data, table + index * INT_NUM_BYTES)?;
        let offset = usize::try_from(offset).map_err(|_| {
            SpatialError::CorruptIndexFormat(format!("negative child offset {}", offset))
        })?;
        // Children are written after their parent, so offsets only grow.
        if offset <= self.offset_from_initial {
            return Err(SpatialError::CorruptIndexFormat(format!(
                "child offset {} does not follow parent offset {}",
                offset, self.offset_from_initial
            )));
        }
        if self.initial_offset.saturating_add(offset) >= self.data.len() {
            return Err(SpatialError::CorruptIndexFormat(format!(
                "child offset {} points past the end of the buffer",
                offset
            )));
        }
        ImmutableNode::new(self.num_dims, self.initial_offset, offset, self.data)
    }

    /// Iterates over the children in stored order.
    pub fn children(&self) -> ImmutableChildren<'a> {
        ImmutableChildren {
            node: *self,
            next: 0,
        }
    }

    fn start(&self) -> usize {
        self.initial_offset + self.offset_from_initial
    }

    /// Cannot overflow: `new` rejects dimensionalities whose layout does.
    fn coordinates_len(&self) -> usize {
        self.num_dims * FLOAT_NUM_BYTES
    }

    fn bitmap_size_offset(&self) -> usize {
        self.start()
            .saturating_add(HEADER_NUM_BYTES)
            .saturating_add(self.coordinates_len().saturating_mul(2))
    }

    fn bitmap_size(&self) -> SpatialResult<usize> {
        let size = read_i32(self.data, self.bitmap_size_offset())?;
        usize::try_from(size)
            .map_err(|_| SpatialError::CorruptIndexFormat(format!("negative bitmap size {}", size)))
    }

    fn child_table_offset(&self) -> SpatialResult<usize> {
        Ok(self.bitmap_size_offset() + INT_NUM_BYTES + self.bitmap_size()?)
    }

    fn read_coordinates(&self, offset: usize) -> SpatialResult<Vec<f32>> {
        let bytes = self.slice(offset, self.coordinates_len())?;
        Ok(bytes
            .chunks_exact(FLOAT_NUM_BYTES)
            .map(|chunk| f32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }

    fn slice(&self, offset: usize, len: usize) -> SpatialResult<&'a [u8]> {
        read_slice(self.data, offset, len)
    }
}

impl PartialEq for ImmutableNode<'_> {
    /// Two nodes are equal when they are the same position in the same buffer.
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.data, other.data)
            && self.initial_offset == other.initial_offset
            && self.offset_from_initial == other.offset_from_initial
    }
}

impl Eq for ImmutableNode<'_> {}

/// Iterator over the children of an [`ImmutableNode`].
#[derive(Debug, Clone)]
pub struct ImmutableChildren<'a> {
    node: ImmutableNode<'a>,
    next: usize,
}

impl<'a> Iterator for ImmutableChildren<'a> {
    type Item = SpatialResult<ImmutableNode<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.node.num_children {
            return None;
        }
        let child = self.node.child(self.next);
        self.next += 1;
        Some(child)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.node.num_children - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ImmutableChildren<'_> {}

impl FusedIterator for ImmutableChildren<'_> {}

fn read_slice(data: &[u8], offset: usize, len: usize) -> SpatialResult<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| {
            SpatialError::CorruptIndexFormat(format!(
                "read of {} bytes at offset {} exceeds buffer of {} bytes",
                len,
                offset,
                data.len()
            ))
        })
}

fn read_u16(data: &[u8], offset: usize) -> SpatialResult<u16> {
    let bytes = read_slice(data, offset, HEADER_NUM_BYTES)?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn read_i32(data: &[u8], offset: usize) -> SpatialResult<i32> {
    let bytes = read_slice(data, offset, INT_NUM_BYTES)?;
    Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::immutable::serialize;
    use crate::rtree::{RTree, RTreeConfig};
    use roaring::RoaringBitmap;

    fn sample_tree() -> RTree {
        let config = RTreeConfig::builder(2).max_entries(4).build().unwrap();
        let mut tree = RTree::new(config).unwrap();
        for i in 0..20u32 {
            let x = (i % 5) as f32;
            let y = (i / 5) as f32;
            tree.insert(&[x, y], i).unwrap();
        }
        tree
    }

    fn collect_points(node: ImmutableNode<'_>, out: &mut Vec<(Vec<f32>, Vec<u32>)>) {
        if node.is_point() {
            let bitmap: RoaringBitmap = node.bitmap().unwrap();
            out.push((node.coordinates().unwrap(), bitmap.iter().collect()));
            return;
        }
        for child in node.children() {
            collect_points(child.unwrap(), out);
        }
    }

    #[test]
    fn test_root_matches_mutable_root() {
        let tree = sample_tree();
        let bytes = serialize(&tree).unwrap();
        let root = ImmutableNode::new(2, 0, 0, &bytes).unwrap();

        assert_eq!(root.offset_from_initial(), 0);
        assert_eq!(root.is_leaf(), tree.root().is_leaf());
        assert_eq!(root.num_children(), tree.root().len());
        assert_eq!(root.min_coordinates().unwrap(), vec![0.0, 0.0]);
        assert_eq!(root.max_coordinates().unwrap(), vec![4.0, 3.0]);
        let bitmap: RoaringBitmap = root.bitmap().unwrap();
        assert_eq!(bitmap, *tree.root().bitmap());
    }

    #[test]
    fn test_points_hold_every_entry() {
        let tree = sample_tree();
        let bytes = serialize(&tree).unwrap();
        let root = ImmutableNode::new(2, 0, 0, &bytes).unwrap();

        let mut points = Vec::new();
        collect_points(root, &mut points);
        points.sort_by_key(|(_, ids)| ids[0]);

        assert_eq!(points.len(), 20);
        for (i, (coordinates, ids)) in points.iter().enumerate() {
            assert_eq!(ids, &vec![i as u32]);
            assert_eq!(coordinates, &vec![(i % 5) as f32, (i / 5) as f32]);
        }
    }

    #[test]
    fn test_point_node() {
        let mut tree: RTree = RTree::new(RTreeConfig::new(3)).unwrap();
        tree.insert(&[1.0, 2.0, 3.0], 77).unwrap();
        let bytes = serialize(&tree).unwrap();
        let root = ImmutableNode::new(3, 0, 0, &bytes).unwrap();

        assert!(root.is_leaf());
        assert!(!root.is_point());
        let point = root.child(0).unwrap();
        assert!(point.is_point());
        assert_eq!(point.num_children(), 0);
        assert_eq!(point.min_coordinates().unwrap(), point.max_coordinates().unwrap());
        assert!(point.bounding_box().unwrap().is_point());
        let bitmap: RoaringBitmap = point.bitmap().unwrap();
        assert_eq!(bitmap.iter().collect::<Vec<_>>(), vec![77]);
    }

    #[test]
    fn test_initial_offset() {
        let tree = sample_tree();
        let bytes = serialize(&tree).unwrap();
        let mut prefixed = vec![0u8; 11];
        prefixed.extend_from_slice(&bytes);

        let plain = ImmutableNode::new(2, 0, 0, &bytes).unwrap();
        let shifted = ImmutableNode::new(2, 11, 0, &prefixed).unwrap();
        for (a, b) in plain.children().zip(shifted.children()) {
            let (a, b) = (a.unwrap(), b.unwrap());
            assert_eq!(a.offset_from_initial(), b.offset_from_initial());
            assert_eq!(a.bitmap_bytes().unwrap(), b.bitmap_bytes().unwrap());
        }
    }

    #[test]
    fn test_children_iterator_size() {
        let tree = sample_tree();
        let bytes = serialize(&tree).unwrap();
        let root = ImmutableNode::new(2, 0, 0, &bytes).unwrap();

        let mut children = root.children();
        assert_eq!(children.len(), root.num_children());
        children.next();
        assert_eq!(children.len(), root.num_children() - 1);
        assert!(root.child(root.num_children()).is_err());
    }

    #[test]
    fn test_truncated_buffer() {
        let tree = sample_tree();
        let bytes = serialize(&tree).unwrap();

        assert!(matches!(
            ImmutableNode::new(2, 0, 0, &bytes[..1]),
            Err(SpatialError::CorruptIndexFormat(_))
        ));
        assert!(ImmutableNode::new(2, 0, 0, &bytes[..10]).is_err());
    }

    #[test]
    fn test_negative_bitmap_size() {
        let mut tree: RTree = RTree::new(RTreeConfig::new(1)).unwrap();
        tree.insert(&[1.0], 1).unwrap();
        let mut bytes = serialize(&tree).unwrap();
        // header (2) + min (4) + max (4)
        bytes[10..14].copy_from_slice(&(-5i32).to_be_bytes());

        let root = ImmutableNode::new(1, 0, 0, &bytes).unwrap();
        assert!(matches!(root.bitmap_bytes(), Err(SpatialError::CorruptIndexFormat(_))));
        assert!(root.child(0).is_err());
    }

    #[test]
    fn test_huge_dimensionality_rejected() {
        let tree = sample_tree();
        let bytes = serialize(&tree).unwrap();

        assert!(matches!(
            ImmutableNode::new(usize::MAX, 0, 0, &bytes),
            Err(SpatialError::CorruptIndexFormat(_))
        ));
        assert!(matches!(
            ImmutableNode::new(usize::MAX / 4, 0, 0, &bytes),
            Err(SpatialError::CorruptIndexFormat(_))
        ));
    }

    #[test]
    fn test_child_offset_pointing_backwards() {
        let tree = sample_tree();
        let mut bytes = serialize(&tree).unwrap();
        let root = ImmutableNode::new(2, 0, 0, &bytes).unwrap();
        let first = root.child(0).unwrap();
        let first_offset = first.offset_from_initial();
        let first_table = first.child_table_offset().unwrap();

        // The first child now lists itself as its own child.
        bytes[first_table..first_table + 4].copy_from_slice(&(first_offset as i32).to_be_bytes());
        let first = ImmutableNode::new(2, 0, first_offset, &bytes).unwrap();
        assert!(matches!(first.child(0), Err(SpatialError::CorruptIndexFormat(_))));
    }

    #[test]
    fn test_child_offset_out_of_bounds() {
        let mut tree: RTree = RTree::new(RTreeConfig::new(1)).unwrap();
        tree.insert(&[1.0], 1).unwrap();
        let mut bytes = serialize(&tree).unwrap();
        let root = ImmutableNode::new(1, 0, 0, &bytes).unwrap();
        let table = root.child_table_offset().unwrap();

        bytes[table..table + 4].copy_from_slice(&i32::MAX.to_be_bytes());
        let root = ImmutableNode::new(1, 0, 0, &bytes).unwrap();
        assert!(matches!(root.child(0), Err(SpatialError::CorruptIndexFormat(_))));

        bytes[table..table + 4].copy_from_slice(&(-1i32).to_be_bytes());
        let root = ImmutableNode::new(1, 0, 0, &bytes).unwrap();
        assert!(matches!(root.child(0), Err(SpatialError::CorruptIndexFormat(_))));
    }
}
