//! Identifier-set capability used for the aggregate bitmap of every node.
//!
//! The tree only needs to create, union, test and (de)serialize id sets, so
//! any integer-set type can back it. [`RoaringBitmap`] is the default; the
//! `BTreeSet<u32>` implementation is an uncompressed alternative.

use std::collections::BTreeSet;
use std::fmt;

use roaring::RoaringBitmap;

use crate::rtree::{EntryId, SpatialError, SpatialResult};

/// A set of entry ids that can be stored inside a serialized node.
pub trait Bitmap: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Creates a set holding only `id`.
    fn singleton(id: EntryId) -> Self {
        let mut bitmap = Self::default();
        bitmap.insert(id);
        bitmap
    }

    fn insert(&mut self, id: EntryId);

    /// Adds every id of `other` to this set.
    fn union_with(&mut self, other: &Self);

    fn contains(&self, id: EntryId) -> bool;

    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the ids in ascending order.
    fn ids(&self) -> Vec<EntryId>;

    /// Serializes the set into the bytes stored in a node's bitmap region.
    fn to_bytes(&self) -> SpatialResult<Vec<u8>>;

    /// Reads a set back from a node's bitmap region.
    fn from_bytes(bytes: &[u8]) -> SpatialResult<Self>;
}

impl Bitmap for RoaringBitmap {
    fn insert(&mut self, id: EntryId) {
        RoaringBitmap::insert(self, id);
    }

    fn union_with(&mut self, other: &Self) {
        *self |= other;
    }

    fn contains(&self, id: EntryId) -> bool {
        RoaringBitmap::contains(self, id)
    }

    fn len(&self) -> u64 {
        RoaringBitmap::len(self)
    }

    fn ids(&self) -> Vec<EntryId> {
        self.iter().collect()
    }

    fn to_bytes(&self) -> SpatialResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.serialized_size());
        self.serialize_into(&mut bytes)?;
        Ok(bytes)
    }

    fn from_bytes(bytes: &[u8]) -> SpatialResult<Self> {
        RoaringBitmap::deserialize_from(bytes)
            .map_err(|e| SpatialError::CorruptIndexFormat(format!("invalid roaring bitmap: {}", e)))
    }
}

/// Uncompressed layout: `u32` count followed by each id, big-endian.
impl Bitmap for BTreeSet<EntryId> {
    fn insert(&mut self, id: EntryId) {
        BTreeSet::insert(self, id);
    }

    fn union_with(&mut self, other: &Self) {
        self.extend(other.iter().copied());
    }

    fn contains(&self, id: EntryId) -> bool {
        BTreeSet::contains(self, &id)
    }

    fn len(&self) -> u64 {
        BTreeSet::len(self) as u64
    }

    fn ids(&self) -> Vec<EntryId> {
        self.iter().copied().collect()
    }

    fn to_bytes(&self) -> SpatialResult<Vec<u8>> {
        let count = u32::try_from(BTreeSet::len(self)).map_err(|_| {
            SpatialError::InvalidOperation("id set too large to serialize".into())
        })?;
        let mut bytes = Vec::with_capacity(4 + 4 * BTreeSet::len(self));
        bytes.extend_from_slice(&count.to_be_bytes());
        for id in self {
            bytes.extend_from_slice(&id.to_be_bytes());
        }
        Ok(bytes)
    }

    fn from_bytes(bytes: &[u8]) -> SpatialResult<Self> {
        let corrupt = || SpatialError::CorruptIndexFormat("invalid id set encoding".into());
        let (count, body) = bytes.split_first_chunk::<4>().ok_or_else(corrupt)?;
        let count = u32::from_be_bytes(*count) as usize;
        if body.len() != count.saturating_mul(4) {
            return Err(corrupt());
        }
        Ok(body
            .chunks_exact(4)
            .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }
}
