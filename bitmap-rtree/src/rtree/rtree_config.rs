//! Tree configuration: dimensionality, node capacity and split policy.

use serde::{Deserialize, Serialize};

use super::rtree_constants::{DEFAULT_MAX_ENTRIES, DEFAULT_MIN_ENTRIES, MAX_CHILDREN};
use super::rtree_types::{SpatialError, SpatialResult};
use crate::split::{LinearSplitStrategy, NodeCapacity, QuadraticSplitStrategy, SplitStrategy};

/// Which node-splitting heuristic a tree uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitKind {
    /// Linear-cost seed picking, children distributed in order.
    #[default]
    Linear,
    /// Quadratic-cost seed picking by wasted area.
    Quadratic,
}

impl SplitKind {
    /// Creates the strategy implementing this heuristic.
    pub fn create_strategy(self) -> Box<dyn SplitStrategy> {
        match self {
            SplitKind::Linear => Box::new(LinearSplitStrategy),
            SplitKind::Quadratic => Box::new(QuadraticSplitStrategy),
        }
    }
}

/// Configuration of an [`RTree`](crate::RTree).
///
/// ```rust
/// use bitmap_rtree::{RTreeConfig, SplitKind};
///
/// let config = RTreeConfig::builder(2)
///     .min_entries(2)
///     .max_entries(16)
///     .split(SplitKind::Quadratic)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.max_entries(), 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTreeConfig {
    num_dims: usize,
    #[serde(default = "default_min_entries")]
    min_entries: usize,
    #[serde(default = "default_max_entries")]
    max_entries: usize,
    #[serde(default)]
    split: SplitKind,
}

fn default_min_entries() -> usize {
    DEFAULT_MIN_ENTRIES
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

impl RTreeConfig {
    /// Reference configuration for `num_dims` dimensions: 0/50 entries, linear split.
    pub fn new(num_dims: usize) -> Self {
        Self {
            num_dims,
            min_entries: DEFAULT_MIN_ENTRIES,
            max_entries: DEFAULT_MAX_ENTRIES,
            split: SplitKind::default(),
        }
    }

    pub fn builder(num_dims: usize) -> RTreeConfigBuilder {
        RTreeConfigBuilder {
            config: Self::new(num_dims),
        }
    }

    pub fn num_dims(&self) -> usize {
        self.num_dims
    }

    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn split(&self) -> SplitKind {
        self.split
    }

    pub fn capacity(&self) -> NodeCapacity {
        NodeCapacity {
            min_entries: self.min_entries,
            max_entries: self.max_entries,
        }
    }

    /// Checks that a tree can be built with this configuration.
    ///
    /// A split of `max_entries + 1` children must leave both halves with at
    /// least `min_entries`, and a node must fit the 15-bit header count.
    pub fn validate(&self) -> SpatialResult<()> {
        if self.num_dims == 0 {
            return Err(SpatialError::InvalidConfig(
                "num_dims must be at least 1".into(),
            ));
        }
        if self.max_entries < 2 {
            return Err(SpatialError::InvalidConfig(format!(
                "max_entries must be at least 2, got {}",
                self.max_entries
            )));
        }
        if self.max_entries > MAX_CHILDREN {
            return Err(SpatialError::InvalidConfig(format!(
                "max_entries must not exceed {}, got {}",
                MAX_CHILDREN, self.max_entries
            )));
        }
        if self.min_entries > self.max_entries / 2 {
            return Err(SpatialError::InvalidConfig(format!(
                "min_entries ({}) must not exceed half of max_entries ({})",
                self.min_entries, self.max_entries
            )));
        }
        Ok(())
    }
}

/// Builder for [`RTreeConfig`]; `build` validates the result.
#[derive(Debug, Clone)]
pub struct RTreeConfigBuilder {
    config: RTreeConfig,
}

impl RTreeConfigBuilder {
    #[inline]
    pub fn min_entries(mut self, min_entries: usize) -> Self {
        self.config.min_entries = min_entries;
        self
    }

    #[inline]
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.config.max_entries = max_entries;
        self
    }

    #[inline]
    pub fn split(mut self, split: SplitKind) -> Self {
        self.config.split = split;
        self
    }

    #[inline]
    pub fn build(self) -> SpatialResult<RTreeConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
