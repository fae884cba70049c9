use serde::{Deserialize, Serialize};

/// An n-dimensional axis-aligned bounding box.
///
/// `BoundingBox` holds one minimum and one maximum coordinate per dimension.
/// It is the minimum bounding rectangle (MBR) tracked by every node of the
/// R-Tree, and a point is simply a box whose minimum equals its maximum.
///
/// An empty box has `+inf` minimums and `-inf` maximums, so expanding it with
/// any other box yields that other box.
///
/// # Examples
///
/// ```rust
/// use bitmap_rtree::BoundingBox;
///
/// let mut bbox = BoundingBox::point(&[1.0, 2.0]);
/// bbox.expand(&BoundingBox::point(&[10.0, 7.0]));
///
/// assert_eq!(bbox.min(), &[1.0, 2.0]);
/// assert_eq!(bbox.max(), &[10.0, 7.0]);
/// assert_eq!(bbox.area(), 45.0);
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct BoundingBox {
    min: Vec<f32>,
    max: Vec<f32>,
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoundingBox({:?}, {:?})", self.min, self.max)
    }
}

impl BoundingBox {
    /// Creates a new bounding box from its minimum and maximum corners.
    ///
    /// Both corners must have the same number of dimensions.
    pub fn new(min: Vec<f32>, max: Vec<f32>) -> BoundingBox {
        debug_assert_eq!(min.len(), max.len(), "corner dimensionality differs");
        BoundingBox { min, max }
    }

    /// Creates a degenerate box covering a single point.
    pub fn point(coordinates: &[f32]) -> BoundingBox {
        BoundingBox {
            min: coordinates.to_vec(),
            max: coordinates.to_vec(),
        }
    }

    /// Creates an empty box with the given number of dimensions.
    pub fn empty(num_dims: usize) -> BoundingBox {
        BoundingBox {
            min: vec![f32::INFINITY; num_dims],
            max: vec![f32::NEG_INFINITY; num_dims],
        }
    }

    /// Returns the number of dimensions.
    pub fn num_dims(&self) -> usize {
        self.min.len()
    }

    /// Returns the minimum corner.
    pub fn min(&self) -> &[f32] {
        &self.min
    }

    /// Returns the maximum corner.
    pub fn max(&self) -> &[f32] {
        &self.max
    }

    /// Checks if this box covers nothing (some minimum exceeds its maximum).
    pub fn is_empty(&self) -> bool {
        self.min.iter().zip(&self.max).any(|(lo, hi)| lo > hi)
    }

    /// Checks if this box is a single point.
    pub fn is_point(&self) -> bool {
        self.min == self.max
    }

    /// Returns the area of the box: the product over all dimensions of
    /// `max[i] - min[i]`. An empty box has zero area.
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.min
            .iter()
            .zip(&self.max)
            .map(|(lo, hi)| f64::from(hi - lo))
            .product()
    }

    /// Returns how much the area grows if this box is expanded to include `other`.
    pub fn enlargement(&self, other: &BoundingBox) -> f64 {
        self.union(other).area() - self.area()
    }

    /// Returns the smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut merged = self.clone();
        merged.expand(other);
        merged
    }

    /// Grows this box in place so it contains `other`.
    pub fn expand(&mut self, other: &BoundingBox) {
        self.expand_min_max(&other.min, &other.max);
    }

    /// Grows this box in place so it contains the given point.
    pub fn expand_point(&mut self, coordinates: &[f32]) {
        self.expand_min_max(coordinates, coordinates);
    }

    fn expand_min_max(&mut self, min: &[f32], max: &[f32]) {
        for (lo, other) in self.min.iter_mut().zip(min) {
            *lo = lo.min(*other);
        }
        for (hi, other) in self.max.iter_mut().zip(max) {
            *hi = hi.max(*other);
        }
    }

    /// Checks if this box intersects another box. Touching counts.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        (0..self.num_dims()).all(|i| self.min[i] <= other.max[i] && self.max[i] >= other.min[i])
    }

    /// Checks if this box fully contains another box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        (0..self.num_dims()).all(|i| self.min[i] <= other.min[i] && self.max[i] >= other.max[i])
    }

    /// Checks if this box contains a point, boundaries included.
    pub fn contains_point(&self, coordinates: &[f32]) -> bool {
        coordinates.len() == self.num_dims()
            && coordinates
                .iter()
                .enumerate()
                .all(|(i, c)| *c >= self.min[i] && *c <= self.max[i])
    }
}
