//! Warehouse envelope and the clamp ranges that keep objects inside it.
//!
//! The warehouse is centred on the origin in X/Z with its floor at
//! y = 0. Shelf positions name the centre of the shelf's base; product
//! positions name the centre of the product box.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::types::{LayoutConfig, Rotation, Vec3, WarehouseParams};

/// Building envelope. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarehouseBounds {
    width: f64,
    height: f64,
    depth: f64,
}

impl WarehouseBounds {
    pub fn new(params: WarehouseParams, config: &LayoutConfig) -> Result<Self> {
        let WarehouseParams {
            width,
            height,
            depth,
        } = params;
        // NaN fails every comparison, so test for positivity, not <= 0.
        if !(width > 0.0 && height > 0.0 && depth > 0.0) {
            return Err(LayoutError::InvalidDimensions(format!(
                "warehouse {width} x {height} x {depth} must be positive"
            )));
        }
        let over = |value: f64, limit: Option<f64>| limit.is_some_and(|max| value > max);
        if over(width, config.max_warehouse_width)
            || over(height, config.max_warehouse_height)
            || over(depth, config.max_warehouse_depth)
        {
            return Err(LayoutError::DimensionLimit(format!(
                "warehouse {width} x {height} x {depth} exceeds the configured maximum"
            )));
        }
        Ok(Self {
            width,
            height,
            depth,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn params(&self) -> WarehouseParams {
        WarehouseParams {
            width: self.width,
            height: self.height,
            depth: self.depth,
        }
    }

    /// True iff each extent is within the matching warehouse extent.
    pub fn fits(&self, width: f64, height: f64, depth: f64) -> bool {
        width <= self.width && height <= self.height && depth <= self.depth
    }

    pub fn fits_footprint(&self, footprint: Footprint) -> bool {
        self.fits(footprint.width, footprint.height, footprint.depth)
    }

    /// True if (x, z) lies on the floor rectangle.
    pub fn contains_floor_point(&self, x: f64, z: f64) -> bool {
        x.abs() <= self.width / 2.0 && z.abs() <= self.depth / 2.0
    }

    /// Range the centre of an object may occupy.
    pub fn clamp_range(&self, footprint: Footprint, rotation: Rotation, kind: ClampKind) -> ClampRange {
        let oriented = footprint.oriented(rotation);
        let half_x = self.width / 2.0 - oriented.width / 2.0;
        let half_z = self.depth / 2.0 - oriented.depth / 2.0;
        let (min_y, max_y) = match kind {
            ClampKind::Shelf => (0.0, 0.0),
            ClampKind::FloorProduct { ceiling } => (footprint.height / 2.0, ceiling),
            ClampKind::BoundProduct { y } => (y, y),
        };
        ClampRange {
            min: Vec3::new(-half_x, min_y, -half_z),
            max: Vec3::new(half_x, max_y, half_z),
        }
    }
}

impl Default for WarehouseBounds {
    /// The 50 x 10 x 50 envelope used when a requested one is rejected.
    fn default() -> Self {
        let WarehouseParams {
            width,
            height,
            depth,
        } = WarehouseParams::default();
        Self {
            width,
            height,
            depth,
        }
    }
}

/// Unrotated extents of a shelf or product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Footprint {
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// World-axis extents after rotating about Y; width and depth swap
    /// at 90 degrees.
    pub fn oriented(self, rotation: Rotation) -> Footprint {
        if rotation.swaps_axes() {
            Footprint::new(self.depth, self.height, self.width)
        } else {
            self
        }
    }
}

/// What is being clamped decides the vertical freedom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClampKind {
    /// Shelves always stand on the floor.
    Shelf,
    /// Unbound products rest on the floor and may be lifted up to `ceiling`.
    FloorProduct { ceiling: f64 },
    /// Products in a bin are pinned to the bin's height.
    BoundProduct { y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClampRange {
    pub min: Vec3,
    pub max: Vec3,
}

/// Componentwise `min(max(p, min), max)`.
pub fn clamp(position: Vec3, range: &ClampRange) -> Vec3 {
    Vec3::new(
        position.x.max(range.min.x).min(range.max.x),
        position.y.max(range.min.y).min(range.max.y),
        position.z.max(range.min.z).min(range.max.z),
    )
}
