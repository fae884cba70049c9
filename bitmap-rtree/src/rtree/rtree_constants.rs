//! Constants for the R-Tree and its serialized byte layout.

/// Minimum children per non-root node in the reference configuration
pub const DEFAULT_MIN_ENTRIES: usize = 0;

/// Maximum children per node before a split in the reference configuration
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Largest child count the 15-bit node header can hold
pub const MAX_CHILDREN: usize = 0x7FFF;

/// Header bit marking a leaf (or point) node
pub const LEAF_FLAG: u16 = 0x8000;

/// Header bits holding the child count
pub const CHILD_COUNT_MASK: u16 = 0x7FFF;

/// Size of the per-node header
pub const HEADER_NUM_BYTES: usize = 2;

/// Size of one serialized coordinate (`f32`)
pub const FLOAT_NUM_BYTES: usize = 4;

/// Size of the bitmap length field and of each child offset (`i32`)
pub const INT_NUM_BYTES: usize = 4;

/// Version byte written at the start of an immutable tree buffer
pub const FORMAT_VERSION: u8 = 0;

/// Version byte plus the `i32` dimensionality
pub const TREE_HEADER_NUM_BYTES: usize = 1 + INT_NUM_BYTES;
