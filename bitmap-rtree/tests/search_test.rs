mod common;

use bitmap_rtree::{Bound, ImmutableRTree, RadiusBound, RectangularBound, SplitKind};
use common::{build_tree, init_logging, random_points};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roaring::RoaringBitmap;

fn brute_force<Q: Bound>(points: &[Vec<f32>], bound: &Q) -> RoaringBitmap {
    points
        .iter()
        .enumerate()
        .filter(|(_, point)| bound.contains_point(point))
        .map(|(id, _)| id as u32)
        .collect()
}

#[test]
fn test_rectangular_search_matches_scan() {
    init_logging();
    let points = random_points(31, 2000, 2);
    let tree = build_tree(&points, 10, SplitKind::Linear);
    let immutable = ImmutableRTree::from_mutable(&tree).unwrap();

    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..50 {
        let x: f32 = rng.gen_range(0.0..100.0);
        let y: f32 = rng.gen_range(0.0..100.0);
        let w: f32 = rng.gen_range(0.0..40.0);
        let h: f32 = rng.gen_range(0.0..40.0);
        let bound = RectangularBound::new(vec![x, y], vec![x + w, y + h]).unwrap();

        let result: RoaringBitmap = immutable.search(&bound).unwrap();
        assert_eq!(result, brute_force(&points, &bound));
    }
}

#[test]
fn test_radius_search_matches_scan() {
    let points = random_points(32, 2000, 3);
    let tree = build_tree(&points, 10, SplitKind::Quadratic);
    let immutable = ImmutableRTree::from_mutable(&tree).unwrap();

    let mut rng = StdRng::seed_from_u64(98);
    for _ in 0..50 {
        let center: Vec<f32> = (0..3).map(|_| rng.gen_range(0.0f32..100.0)).collect();
        let radius: f32 = rng.gen_range(0.0..30.0);
        let bound = RadiusBound::new(center, radius).unwrap();

        let result: RoaringBitmap = immutable.search(&bound).unwrap();
        assert_eq!(result, brute_force(&points, &bound));
    }
}

#[test]
fn test_search_outside_data() {
    let points = random_points(33, 500, 2);
    let tree = build_tree(&points, 10, SplitKind::Linear);
    let immutable = ImmutableRTree::from_mutable(&tree).unwrap();

    let bound = RectangularBound::new(vec![200.0, 200.0], vec![300.0, 300.0]).unwrap();
    let result: RoaringBitmap = immutable.search(&bound).unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_search_covering_all_data() {
    let points = random_points(34, 500, 2);
    let tree = build_tree(&points, 10, SplitKind::Linear);
    let immutable = ImmutableRTree::from_mutable(&tree).unwrap();

    let bound = RadiusBound::new(vec![50.0, 50.0], 1000.0).unwrap();
    let result: RoaringBitmap = immutable.search(&bound).unwrap();
    assert_eq!(result, (0..500).collect::<RoaringBitmap>());
}
