//! Query regions for searching an immutable tree.

use std::fmt;

use crate::rtree::{SpatialError, SpatialResult};

/// A region a search can be run against.
///
/// Node boxes are passed as separate min/max coordinate slices so they can
/// be tested straight from the serialized layout.
pub trait Bound: fmt::Debug + Send + Sync {
    fn num_dims(&self) -> usize;

    /// True when the box may hold points inside the region.
    fn overlaps(&self, min: &[f32], max: &[f32]) -> bool;

    /// True when every point of the box is inside the region.
    fn covers(&self, min: &[f32], max: &[f32]) -> bool;

    fn contains_point(&self, coordinates: &[f32]) -> bool;
}

/// Axis-aligned box, inclusive on every edge.
#[derive(Debug, Clone, PartialEq)]
pub struct RectangularBound {
    min: Vec<f32>,
    max: Vec<f32>,
}

impl RectangularBound {
    pub fn new(min: Vec<f32>, max: Vec<f32>) -> SpatialResult<Self> {
        if min.len() != max.len() {
            return Err(SpatialError::DimensionMismatch {
                expected: min.len(),
                actual: max.len(),
            });
        }
        if min.is_empty() {
            return Err(SpatialError::InvalidOperation("bound has no dimensions".into()));
        }
        if min.iter().zip(&max).any(|(lo, hi)| !(lo <= hi)) {
            return Err(SpatialError::InvalidOperation(format!(
                "bound min {:?} exceeds max {:?}",
                min, max
            )));
        }
        Ok(RectangularBound { min, max })
    }

    pub fn min(&self) -> &[f32] {
        &self.min
    }

    pub fn max(&self) -> &[f32] {
        &self.max
    }
}

impl Bound for RectangularBound {
    fn num_dims(&self) -> usize {
        self.min.len()
    }

    fn overlaps(&self, min: &[f32], max: &[f32]) -> bool {
        (0..self.min.len()).all(|i| min[i] <= self.max[i] && max[i] >= self.min[i])
    }

    fn covers(&self, min: &[f32], max: &[f32]) -> bool {
        (0..self.min.len()).all(|i| min[i] >= self.min[i] && max[i] <= self.max[i])
    }

    fn contains_point(&self, coordinates: &[f32]) -> bool {
        self.covers(coordinates, coordinates)
    }
}

/// Euclidean ball around a center, boundary included.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusBound {
    center: Vec<f32>,
    radius: f32,
}

impl RadiusBound {
    pub fn new(center: Vec<f32>, radius: f32) -> SpatialResult<Self> {
        if center.is_empty() {
            return Err(SpatialError::InvalidOperation("bound has no dimensions".into()));
        }
        if !(radius >= 0.0) || !radius.is_finite() {
            return Err(SpatialError::InvalidOperation(format!(
                "radius must be finite and non-negative, got {}",
                radius
            )));
        }
        Ok(RadiusBound { center, radius })
    }

    pub fn center(&self) -> &[f32] {
        &self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    fn radius_squared(&self) -> f64 {
        let radius = f64::from(self.radius);
        radius * radius
    }
}

impl Bound for RadiusBound {
    fn num_dims(&self) -> usize {
        self.center.len()
    }

    fn overlaps(&self, min: &[f32], max: &[f32]) -> bool {
        // Distance to the closest point of the box.
        let distance: f64 = self
            .center
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let c = f64::from(c);
                let nearest = c.clamp(f64::from(min[i]), f64::from(max[i]));
                (c - nearest) * (c - nearest)
            })
            .sum();
        distance <= self.radius_squared()
    }

    fn covers(&self, min: &[f32], max: &[f32]) -> bool {
        // Distance to the farthest corner of the box.
        let distance: f64 = self
            .center
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let c = f64::from(c);
                let far = (c - f64::from(min[i])).abs().max((f64::from(max[i]) - c).abs());
                far * far
            })
            .sum();
        distance <= self.radius_squared()
    }

    fn contains_point(&self, coordinates: &[f32]) -> bool {
        let distance: f64 = self
            .center
            .iter()
            .zip(coordinates)
            .map(|(&c, &p)| {
                let d = f64::from(p) - f64::from(c);
                d * d
            })
            .sum();
        distance <= self.radius_squared()
    }
}
