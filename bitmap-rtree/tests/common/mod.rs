#![allow(dead_code)]

use bitmap_rtree::{Bitmap, ImmutableNode, NodeRef, RTree, RTreeConfig, SpatialResult, SplitKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roaring::RoaringBitmap;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Points with coordinates in `[0, 100)` on every axis.
pub fn random_points(seed: u64, count: usize, num_dims: usize) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..num_dims).map(|_| rng.gen_range(0.0f32..100.0)).collect())
        .collect()
}

/// Inserts `points` with ids equal to their index.
pub fn build_tree(points: &[Vec<f32>], max_entries: usize, split: SplitKind) -> RTree {
    let num_dims = points.first().map_or(2, Vec::len);
    let config = RTreeConfig::builder(num_dims)
        .max_entries(max_entries)
        .split(split)
        .build()
        .unwrap();
    let mut tree = RTree::new(config).unwrap();
    for (id, point) in points.iter().enumerate() {
        tree.insert(point, id as u32).unwrap();
    }
    tree
}

/// A node flattened for comparison: its box, bitmap and children.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeShape {
    pub is_leaf: bool,
    pub min: Vec<f32>,
    pub max: Vec<f32>,
    pub ids: Vec<u32>,
    pub children: Vec<NodeShape>,
}

pub fn mutable_shape(node: NodeRef<'_, RoaringBitmap>) -> NodeShape {
    let children = if node.is_leaf() {
        node.entries()
            .iter()
            .map(|entry| NodeShape {
                is_leaf: true,
                min: entry.coordinates().to_vec(),
                max: entry.coordinates().to_vec(),
                ids: vec![entry.id()],
                children: Vec::new(),
            })
            .collect()
    } else {
        node.children().map(mutable_shape).collect()
    };
    NodeShape {
        is_leaf: node.is_leaf(),
        min: node.min_coordinates().to_vec(),
        max: node.max_coordinates().to_vec(),
        ids: node.bitmap().ids(),
        children,
    }
}

pub fn immutable_shape(node: ImmutableNode<'_>) -> SpatialResult<NodeShape> {
    let bitmap: RoaringBitmap = node.bitmap()?;
    let children = node
        .children()
        .map(|child| immutable_shape(child?))
        .collect::<SpatialResult<Vec<_>>>()?;
    Ok(NodeShape {
        is_leaf: node.is_leaf(),
        min: node.min_coordinates()?,
        max: node.max_coordinates()?,
        ids: bitmap.ids(),
        children,
    })
}

/// Every `(coordinates, id)` pair stored beneath `node`, sorted by id.
pub fn immutable_points(node: ImmutableNode<'_>) -> SpatialResult<Vec<(Vec<f32>, u32)>> {
    let mut points = Vec::new();
    let mut stack = vec![node];
    while let Some(node) = stack.pop() {
        if node.is_point() {
            let bitmap: RoaringBitmap = node.bitmap()?;
            for id in bitmap.iter() {
                points.push((node.coordinates()?, id));
            }
            continue;
        }
        for child in node.children() {
            stack.push(child?);
        }
    }
    points.sort_by_key(|(_, id)| *id);
    Ok(points)
}
