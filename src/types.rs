//! Data types shared by the layout engine and its JSON boundary.
//!
//! Everything here derives Serialize + Deserialize so a scene or form
//! collaborator can exchange it as JSON.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::placement::PlacementState;

pub type ShelfId = String;
pub type ProductId = String;

// -- Geometry ------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3 {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, s: f64) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }
}

/// A pick ray in world space, already unprojected from the pointer by
/// the scene collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Ray { origin, direction }
    }

    /// Straight down onto the floor at (x, z), from well above any shelf.
    pub fn vertical(x: f64, z: f64) -> Self {
        Ray::new(Vec3::new(x, 1.0e6, z), Vec3::new(0.0, -1.0, 0.0))
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}

// -- Rotation ------------------------------------------------------

/// Shelf orientation about the vertical axis.
///
/// Only two states exist: shelves are treated as symmetric front to
/// back, so 180 and 270 degrees fold onto 0 and 90.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationDirection {
    Clockwise,
    Counterclockwise,
}

impl Rotation {
    /// Fold an angle in degrees onto the two-state model.
    ///
    /// The angle is folded with `|deg| mod 180`; anything that does not
    /// land on 0 or 90 is rejected.
    pub fn from_degrees(deg: f64) -> Result<Self> {
        if !deg.is_finite() {
            return Err(LayoutError::UnsupportedRotation(deg));
        }
        let folded = deg.abs() % 180.0;
        if folded == 0.0 {
            Ok(Rotation::Deg0)
        } else if folded == 90.0 {
            Ok(Rotation::Deg90)
        } else {
            Err(LayoutError::UnsupportedRotation(deg))
        }
    }

    pub fn degrees(self) -> f64 {
        match self {
            Rotation::Deg0 => 0.0,
            Rotation::Deg90 => 90.0,
        }
    }

    pub fn rotated(self, direction: RotationDirection) -> Self {
        // +-90 then fold: every quarter turn toggles, whichever way.
        match (self, direction) {
            (Rotation::Deg0, RotationDirection::Clockwise) => Rotation::Deg90,
            (Rotation::Deg0, RotationDirection::Counterclockwise) => Rotation::Deg90,
            (Rotation::Deg90, RotationDirection::Clockwise) => Rotation::Deg0,
            (Rotation::Deg90, RotationDirection::Counterclockwise) => Rotation::Deg0,
        }
    }

    /// True when the footprint's width runs along Z instead of X.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90)
    }
}

impl TryFrom<f64> for Rotation {
    type Error = LayoutError;

    fn try_from(deg: f64) -> Result<Self> {
        Rotation::from_degrees(deg)
    }
}

impl From<Rotation> for f64 {
    fn from(r: Rotation) -> f64 {
        r.degrees()
    }
}

// -- Entities ------------------------------------------------------

/// Shelves and products live in separate id spaces, so a bare string
/// is not enough to name an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityId {
    Shelf(ShelfId),
    Product(ProductId),
}

impl EntityId {
    pub fn id(&self) -> &str {
        match self {
            EntityId::Shelf(id) | EntityId::Product(id) => id,
        }
    }

    pub fn is_shelf(&self) -> bool {
        matches!(self, EntityId::Shelf(_))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Shelf(id) => write!(f, "shelf {id}"),
            EntityId::Product(id) => write!(f, "product {id}"),
        }
    }
}

/// A product's back-reference to the bin holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinBinding {
    pub shelf: ShelfId,
    pub column: usize,
    pub row: usize,
}

// -- Configuration -------------------------------------------------

fn default_unit_bin_size() -> f64 {
    2.0
}
fn default_baseplate_height() -> f64 {
    0.2
}
fn default_product_ceiling() -> f64 {
    1.0e8
}
fn default_warehouse_width() -> f64 {
    50.0
}
fn default_warehouse_height() -> f64 {
    10.0
}
fn default_warehouse_depth() -> f64 {
    50.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinDimensions {
    #[serde(default = "default_unit_bin_size")]
    pub width: f64,
    #[serde(default = "default_unit_bin_size")]
    pub height: f64,
    #[serde(default = "default_unit_bin_size")]
    pub depth: f64,
}

impl Default for BinDimensions {
    fn default() -> Self {
        Self {
            width: 2.0,
            height: 2.0,
            depth: 2.0,
        }
    }
}

/// Limits and unit sizes shared by every shelf in one warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub unit_bin: BinDimensions,
    #[serde(default = "default_baseplate_height")]
    pub baseplate_height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_shelf_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_shelf_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_warehouse_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_warehouse_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_warehouse_depth: Option<f64>,
    /// Upper vertical clamp for products resting on the floor.
    #[serde(default = "default_product_ceiling")]
    pub product_ceiling: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            unit_bin: BinDimensions::default(),
            baseplate_height: 0.2,
            max_shelf_width: None,
            max_shelf_height: None,
            max_warehouse_width: None,
            max_warehouse_height: None,
            max_warehouse_depth: None,
            product_ceiling: 1.0e8,
            approval_seed: None,
        }
    }
}

/// Requested warehouse envelope, as typed by the setup form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarehouseParams {
    #[serde(default = "default_warehouse_width")]
    pub width: f64,
    #[serde(default = "default_warehouse_height")]
    pub height: f64,
    #[serde(default = "default_warehouse_depth")]
    pub depth: f64,
}

impl Default for WarehouseParams {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 10.0,
            depth: 50.0,
        }
    }
}

// -- Snapshots -----------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinSnapshot {
    pub column: usize,
    pub row: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ProductId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfSnapshot {
    pub id: ShelfId,
    pub position: Vec3,
    pub rotation: Rotation,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub bin_columns: usize,
    pub bin_rows: usize,
    pub bins: Vec<BinSnapshot>,
    pub dragging: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub position: Vec3,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<BinBinding>,
    pub dragging: bool,
}

/// Everything the scene collaborator needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub warehouse: WarehouseParams,
    pub shelves: Vec<ShelfSnapshot>,
    pub products: Vec<ProductSnapshot>,
    pub session: PlacementState,
}

// -- Tests ---------------------------------------------------------
