use super::{SplitGroup, SplitStrategy};
use crate::bounding_box::BoundingBox;

/// Guttman's quadratic-cost split.
///
/// Seeds are the pair that would waste the most area if grouped together.
/// The next child assigned is the one with the strongest preference for one
/// group over the other.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadraticSplitStrategy;

impl SplitStrategy for QuadraticSplitStrategy {
    fn pick_seeds(&self, boxes: &[BoundingBox]) -> (usize, usize) {
        let mut seeds = (0, 1);
        let mut worst_waste = f64::NEG_INFINITY;

        for i in 0..boxes.len() {
            for j in (i + 1)..boxes.len() {
                let waste = boxes[i].union(&boxes[j]).area() - boxes[i].area() - boxes[j].area();
                if waste > worst_waste {
                    worst_waste = waste;
                    seeds = (i, j);
                }
            }
        }

        seeds
    }

    fn pick_next(
        &self,
        boxes: &[BoundingBox],
        remaining: &[usize],
        groups: &[SplitGroup; 2],
    ) -> usize {
        let mut next = 0;
        let mut strongest = f64::NEG_INFINITY;

        for (position, &index) in remaining.iter().enumerate() {
            let first = groups[0].bounding_box().enlargement(&boxes[index]);
            let second = groups[1].bounding_box().enlargement(&boxes[index]);
            let preference = (first - second).abs();
            if preference > strongest {
                strongest = preference;
                next = position;
            }
        }

        next
    }
}
