//! Writes a mutable tree into the flat node layout.
//!
//! Every node is laid out as (all values big-endian):
//!
//! ```text
//! header        u16      bit 15 = leaf flag, bits 0..15 = child count
//! min coords    f32 x n
//! max coords    f32 x n
//! bitmap size   i32
//! bitmap        bitmap size bytes
//! child offsets i32 x child count, relative to the start of the tree
//! ```
//!
//! Nodes are written depth-first with the parent ahead of its children, so
//! the root sits at offset 0. A parent reserves its offset table and each
//! slot is filled in just before the corresponding child is appended.
//! Entries of a leaf are written as point nodes: leaf flag set, no children,
//! min = max = the point, and a singleton bitmap of the entry id.

use crate::bitmap::Bitmap;
use crate::rtree::rtree_constants::{INT_NUM_BYTES, LEAF_FLAG, MAX_CHILDREN};
use crate::rtree::{Entry, NodeRef, RTree, SpatialError, SpatialResult};

/// Serializes `tree` into a standalone buffer whose root node is at offset 0.
pub fn serialize<B: Bitmap>(tree: &RTree<B>) -> SpatialResult<Vec<u8>> {
    let mut buffer = Vec::new();
    serialize_into(tree, &mut buffer)?;
    Ok(buffer)
}

/// Appends the serialized tree to `buffer`.
///
/// Child offsets are relative to the position where the tree starts, i.e.
/// `buffer.len()` on entry.
pub fn serialize_into<B: Bitmap>(tree: &RTree<B>, buffer: &mut Vec<u8>) -> SpatialResult<()> {
    let base = buffer.len();
    write_node(tree.root(), buffer, base)?;
    log::debug!(
        "serialized {} entries ({} levels) into {} bytes",
        tree.len(),
        tree.height(),
        buffer.len() - base
    );
    Ok(())
}

fn write_node<B: Bitmap>(
    node: NodeRef<'_, B>,
    buffer: &mut Vec<u8>,
    base: usize,
) -> SpatialResult<()> {
    let count = node.len();
    write_header(buffer, node.is_leaf(), count)?;
    write_coordinates(buffer, node.min_coordinates());
    write_coordinates(buffer, node.max_coordinates());
    write_bitmap(buffer, &node.bitmap().to_bytes()?)?;

    let mut slot = buffer.len();
    buffer.resize(slot + count * INT_NUM_BYTES, 0);

    if node.is_leaf() {
        for entry in node.entries() {
            patch_offset(buffer, slot, base)?;
            write_point::<B>(buffer, entry)?;
            slot += INT_NUM_BYTES;
        }
    } else {
        for child in node.children() {
            patch_offset(buffer, slot, base)?;
            write_node(child, buffer, base)?;
            slot += INT_NUM_BYTES;
        }
    }
    Ok(())
}

fn write_point<B: Bitmap>(buffer: &mut Vec<u8>, entry: &Entry) -> SpatialResult<()> {
    write_header(buffer, true, 0)?;
    write_coordinates(buffer, entry.coordinates());
    write_coordinates(buffer, entry.coordinates());
    write_bitmap(buffer, &B::singleton(entry.id()).to_bytes()?)
}

fn write_header(buffer: &mut Vec<u8>, is_leaf: bool, count: usize) -> SpatialResult<()> {
    if count > MAX_CHILDREN {
        return Err(SpatialError::InvalidOperation(format!(
            "node has {} children, the layout holds at most {}",
            count, MAX_CHILDREN
        )));
    }
    // count <= 0x7FFF
    let mut header = count as u16;
    if is_leaf {
        header |= LEAF_FLAG;
    }
    buffer.extend_from_slice(&header.to_be_bytes());
    Ok(())
}

fn write_coordinates(buffer: &mut Vec<u8>, coordinates: &[f32]) {
    for value in coordinates {
        buffer.extend_from_slice(&value.to_be_bytes());
    }
}

fn write_bitmap(buffer: &mut Vec<u8>, bytes: &[u8]) -> SpatialResult<()> {
    let size = i32::try_from(bytes.len()).map_err(|_| {
        SpatialError::InvalidOperation(format!("bitmap of {} bytes is too large", bytes.len()))
    })?;
    buffer.extend_from_slice(&size.to_be_bytes());
    buffer.extend_from_slice(bytes);
    Ok(())
}

/// Stores the current end of the buffer, relative to `base`, at `slot`.
fn patch_offset(buffer: &mut [u8], slot: usize, base: usize) -> SpatialResult<()> {
    let offset = i32::try_from(buffer.len() - base).map_err(|_| {
        SpatialError::InvalidOperation("serialized tree exceeds the i32 offset range".into())
    })?;
    buffer[slot..slot + INT_NUM_BYTES].copy_from_slice(&offset.to_be_bytes());
    Ok(())
}
