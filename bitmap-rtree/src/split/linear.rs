use super::{SplitGroup, SplitStrategy};
use crate::bounding_box::BoundingBox;

/// Guttman's linear-cost split.
///
/// Seeds are the pair of children with the greatest normalized separation
/// along any single axis; the remaining children are assigned in their
/// original order.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSplitStrategy;

impl SplitStrategy for LinearSplitStrategy {
    fn pick_seeds(&self, boxes: &[BoundingBox]) -> (usize, usize) {
        let num_dims = boxes.first().map_or(0, BoundingBox::num_dims);
        let mut seeds = (0, 1);
        let mut best_separation = 0.0_f64;

        for dim in 0..num_dims {
            let mut lowest = f32::INFINITY;
            let mut highest = f32::NEG_INFINITY;
            let mut highest_low_side = (f32::NEG_INFINITY, 0);
            let mut lowest_high_side = (f32::INFINITY, 0);

            for (i, bbox) in boxes.iter().enumerate() {
                let (lo, hi) = (bbox.min()[dim], bbox.max()[dim]);
                lowest = lowest.min(lo);
                highest = highest.max(hi);
                if lo > highest_low_side.0 {
                    highest_low_side = (lo, i);
                }
                if hi < lowest_high_side.0 {
                    lowest_high_side = (hi, i);
                }
            }

            let extent = f64::from(highest) - f64::from(lowest);
            if highest_low_side.1 == lowest_high_side.1 || extent <= 0.0 {
                continue;
            }

            let separation =
                (f64::from(highest_low_side.0) - f64::from(lowest_high_side.0)).abs() / extent;
            if separation > best_separation {
                best_separation = separation;
                seeds = (lowest_high_side.1, highest_low_side.1);
            }
        }

        seeds
    }

    fn pick_next(
        &self,
        _boxes: &[BoundingBox],
        _remaining: &[usize],
        _groups: &[SplitGroup; 2],
    ) -> usize {
        0
    }
}
