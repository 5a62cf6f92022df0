//! Products: named boxes that rest on the floor or sit in a bin.

use crate::bounds::Footprint;
use crate::error::{LayoutError, Result};
use crate::types::{BinBinding, ProductId, ProductSnapshot, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    name: ProductId,
    footprint: Footprint,
    position: Vec3,
    binding: Option<BinBinding>,
}

impl Product {
    /// A new unbound product resting on the floor at the origin.
    pub fn new(name: impl Into<ProductId>, width: f64, height: f64, depth: f64) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LayoutError::InvalidDimensions(
                "product name must not be empty".into(),
            ));
        }
        if !(width > 0.0 && height > 0.0 && depth > 0.0) {
            return Err(LayoutError::InvalidDimensions(format!(
                "product {name}: {width} x {height} x {depth} must be positive"
            )));
        }
        Ok(Self {
            name,
            footprint: Footprint::new(width, height, depth),
            position: Vec3::new(0.0, height / 2.0, 0.0),
            binding: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> f64 {
        self.footprint.width
    }

    pub fn height(&self) -> f64 {
        self.footprint.height
    }

    pub fn depth(&self) -> f64 {
        self.footprint.depth
    }

    pub fn footprint(&self) -> Footprint {
        self.footprint
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn binding(&self) -> Option<&BinBinding> {
        self.binding.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Height the product's centre rests at when standing on the floor.
    pub fn floor_height(&self) -> f64 {
        self.footprint.height / 2.0
    }

    pub(crate) fn bind(&mut self, binding: BinBinding) {
        self.binding = Some(binding);
    }

    pub(crate) fn unbind(&mut self) -> Option<BinBinding> {
        self.binding.take()
    }

    pub fn snapshot(&self, dragging: bool) -> ProductSnapshot {
        ProductSnapshot {
            id: self.name.clone(),
            position: self.position,
            width: self.footprint.width,
            height: self.footprint.height,
            depth: self.footprint.depth,
            binding: self.binding.clone(),
            dragging,
        }
    }
}
