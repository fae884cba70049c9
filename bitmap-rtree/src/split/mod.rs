//! Node splitting.
//!
//! A split partitions the `max_entries + 1` children of an overflowing node
//! into two groups. Strategies only choose the two seeds and the order in
//! which the remaining children are assigned; the shared distribution loop in
//! [`distribute`] places each child into the group whose box grows least and
//! enforces the `min_entries` lower bound.
//!
//! Strategies operate on the children's bounding boxes and return indices, so
//! the same code splits leaves (point entries) and internal nodes.

mod linear;
mod quadratic;

use std::fmt;

use crate::bounding_box::BoundingBox;
use crate::rtree::{SpatialError, SpatialResult};

pub use linear::LinearSplitStrategy;
pub use quadratic::QuadraticSplitStrategy;

/// Child-count bounds of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeCapacity {
    pub min_entries: usize,
    pub max_entries: usize,
}

/// Result of a split: the child indices assigned to each of the two groups.
///
/// Every index of the input appears in exactly one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPartition {
    pub first: Vec<usize>,
    pub second: Vec<usize>,
}

impl SplitPartition {
    /// Moves `items` into two vectors following the partition's indices.
    pub fn apply<T>(&self, items: Vec<T>) -> (Vec<T>, Vec<T>) {
        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        let mut take = |indices: &[usize]| -> Vec<T> {
            indices
                .iter()
                .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
                .collect()
        };
        let first = take(&self.first);
        let second = take(&self.second);
        (first, second)
    }
}

/// A group being filled during a split.
#[derive(Debug, Clone)]
pub struct SplitGroup {
    members: Vec<usize>,
    bbox: BoundingBox,
}

impl SplitGroup {
    fn seeded(index: usize, bbox: &BoundingBox) -> Self {
        Self {
            members: vec![index],
            bbox: bbox.clone(),
        }
    }

    fn push(&mut self, index: usize, bbox: &BoundingBox) {
        self.members.push(index);
        self.bbox.expand(bbox);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bbox
    }
}

/// Policy for partitioning an overflowing node's children.
pub trait SplitStrategy: fmt::Debug + Send + Sync {
    /// Picks the indices of the two children that start the two groups.
    fn pick_seeds(&self, boxes: &[BoundingBox]) -> (usize, usize);

    /// Picks the next child to assign, as a position in `remaining`.
    fn pick_next(
        &self,
        boxes: &[BoundingBox],
        remaining: &[usize],
        groups: &[SplitGroup; 2],
    ) -> usize;

    /// Splits the children whose boxes are given into two groups.
    ///
    /// Fails with [`SpatialError::InvalidSplitInput`] unless there are exactly
    /// `max_entries + 1` boxes.
    fn split(
        &self,
        boxes: &[BoundingBox],
        capacity: NodeCapacity,
    ) -> SpatialResult<SplitPartition> {
        distribute(self, boxes, capacity)
    }
}

/// Guttman's distribution loop shared by all strategies.
pub fn distribute<S: SplitStrategy + ?Sized>(
    strategy: &S,
    boxes: &[BoundingBox],
    capacity: NodeCapacity,
) -> SpatialResult<SplitPartition> {
    let expected = capacity.max_entries + 1;
    if boxes.len() != expected || boxes.len() < 2 {
        return Err(SpatialError::InvalidSplitInput {
            expected,
            actual: boxes.len(),
        });
    }

    let (a, b) = strategy.pick_seeds(boxes);
    let (a, b) = if a == b { (0, 1) } else { (a.min(b), a.max(b)) };

    let mut groups = [SplitGroup::seeded(a, &boxes[a]), SplitGroup::seeded(b, &boxes[b])];
    let mut remaining: Vec<usize> = (0..boxes.len()).filter(|&i| i != a && i != b).collect();

    while !remaining.is_empty() {
        // A group that needs every remaining child to reach min_entries takes them all.
        if let Some(starved) = groups
            .iter()
            .position(|g| g.len() + remaining.len() <= capacity.min_entries)
        {
            for index in remaining.drain(..) {
                groups[starved].push(index, &boxes[index]);
            }
            break;
        }

        let position = strategy.pick_next(boxes, &remaining, &groups);
        let index = remaining.remove(position.min(remaining.len() - 1));
        let target = preferred_group(&groups, &boxes[index]);
        groups[target].push(index, &boxes[index]);
    }

    let [first, second] = groups;
    Ok(SplitPartition {
        first: first.members,
        second: second.members,
    })
}

/// Group needing the smaller area increase; ties go to the smaller group,
/// then to the smaller area, then to the first group.
fn preferred_group(groups: &[SplitGroup; 2], candidate: &BoundingBox) -> usize {
    let growth = [
        groups[0].bbox.enlargement(candidate),
        groups[1].bbox.enlargement(candidate),
    ];
    if growth[0] != growth[1] {
        return if growth[0] < growth[1] { 0 } else { 1 };
    }
    if groups[0].len() != groups[1].len() {
        return if groups[0].len() < groups[1].len() { 0 } else { 1 };
    }
    if groups[1].bbox.area() < groups[0].bbox.area() {
        1
    } else {
        0
    }
}
