//! Shelf layout: a movable grid of bins with a two-state rotation.
//!
//! A shelf's position is the centre of its base on the floor. At 0
//! degrees bin columns run along world X; at 90 degrees they run along
//! world Z. Rows stack upward from the baseplate in both orientations.

use log::{debug, warn};

use crate::bin_grid::BinGrid;
use crate::bounds::Footprint;
use crate::error::{LayoutError, Result};
use crate::prng::Pcg32;
use crate::product::Product;
use crate::registry::Registry;
use crate::types::{
    BinBinding, BinDimensions, LayoutConfig, ProductId, Rotation, RotationDirection, ShelfId,
    ShelfSnapshot, Vec3,
};

#[derive(Debug, Clone)]
pub struct ShelfLayout {
    id: ShelfId,
    bins: BinGrid,
    unit: BinDimensions,
    baseplate_height: f64,
    width: f64,
    height: f64,
    rotation: Rotation,
    position: Vec3,
}

impl ShelfLayout {
    pub fn new(
        id: impl Into<ShelfId>,
        bin_columns: usize,
        bin_rows: usize,
        config: &LayoutConfig,
    ) -> Result<Self> {
        let id = id.into();
        if bin_columns == 0 || bin_rows == 0 {
            return Err(LayoutError::InvalidDimensions(format!(
                "shelf {id}: {bin_columns} x {bin_rows} bins, need at least one of each"
            )));
        }
        let unit = config.unit_bin;
        let Footprint { width, height, .. } = Self::footprint_for(bin_columns, bin_rows, config);
        let over = |value: f64, limit: Option<f64>| limit.is_some_and(|max| value > max);
        if over(width, config.max_shelf_width) || over(height, config.max_shelf_height) {
            return Err(LayoutError::DimensionLimit(format!(
                "shelf {id}: {width} x {height} exceeds the configured maximum"
            )));
        }
        Ok(Self {
            bins: BinGrid::new(id.clone(), bin_columns, bin_rows, unit),
            id,
            unit,
            baseplate_height: config.baseplate_height,
            width,
            height,
            rotation: Rotation::Deg0,
            position: Vec3::ZERO,
        })
    }

    /// Extents a `bin_columns` x `bin_rows` shelf would have, computed
    /// without building its bin grid.
    pub fn footprint_for(bin_columns: usize, bin_rows: usize, config: &LayoutConfig) -> Footprint {
        let unit = config.unit_bin;
        Footprint::new(
            bin_columns as f64 * unit.width,
            bin_rows as f64 * unit.height + config.baseplate_height,
            unit.depth,
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bin_columns(&self) -> usize {
        self.bins.columns()
    }

    pub fn bin_rows(&self) -> usize {
        self.bins.rows()
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Shelves are one bin deep.
    pub fn depth(&self) -> f64 {
        self.unit.depth
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn bins(&self) -> &BinGrid {
        &self.bins
    }

    /// Unrotated extents.
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.width, self.height, self.unit.depth)
    }

    pub(crate) fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub(crate) fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn rotate(&mut self, direction: RotationDirection) -> Rotation {
        self.rotation = self.rotation.rotated(direction);
        self.rotation
    }

    /// Offset of a product's centre in bin (column, row) from the shelf
    /// origin. Products sit on the bin floor, not centred in the band.
    pub fn slot_to_local_position(
        &self,
        column: usize,
        row: usize,
        rotation: Rotation,
        product_height: f64,
    ) -> Result<Vec3> {
        self.bins.get(column, row)?;
        let columns = self.bins.columns() as f64;
        let along = (column as f64 + 0.5 - columns / 2.0) * self.unit.width;
        let y = self.baseplate_height + product_height / 2.0 + row as f64 * self.unit.height;
        Ok(match rotation {
            Rotation::Deg0 => Vec3::new(along, y, 0.0),
            Rotation::Deg90 => Vec3::new(0.0, y, along),
        })
    }

    pub fn slot_world_position(&self, column: usize, row: usize, product_height: f64) -> Result<Vec3> {
        let local = self.slot_to_local_position(column, row, self.rotation, product_height)?;
        Ok(self.position + local)
    }

    /// Put `product` into bin (column, row) and move it there.
    ///
    /// A product already in another bin of this shelf leaves that bin.
    /// A product bound to a different shelf is refused with
    /// `AlreadyBound`; the warehouse releases it first.
    pub fn assign_to_bin(&mut self, product: &mut Product, column: usize, row: usize) -> Result<Vec3> {
        let prior = match product.binding() {
            Some(b) if b.shelf != self.id => {
                return Err(LayoutError::AlreadyBound {
                    product: product.name().to_string(),
                    shelf: b.shelf.clone(),
                });
            }
            Some(b) => Some((b.column, b.row)),
            None => None,
        };
        if self.bins.get(column, row)?.is_occupied() {
            return Err(LayoutError::BinOccupied {
                shelf: self.id.clone(),
                column,
                row,
            });
        }
        let target = self.slot_world_position(column, row, product.height())?;
        if product.height() > self.unit.height - self.baseplate_height {
            warn!(
                "product {} ({}) is taller than a bin band on shelf {}",
                product.name(),
                product.height(),
                self.id
            );
        }

        if let Some((c, r)) = prior {
            self.bins.clear_content(c, r, product.name())?;
        }
        self.bins.set_content(column, row, product.name())?;
        product.bind(BinBinding {
            shelf: self.id.clone(),
            column,
            row,
        });
        product.set_position(target);
        debug!("shelf {}: product {} -> bin ({column}, {row})", self.id, product.name());
        Ok(target)
    }

    /// Rejection-sample an empty bin and assign `product` to it.
    pub fn assign_to_random_free_bin(
        &mut self,
        product: &mut Product,
        rng: &mut Pcg32,
    ) -> Result<(usize, usize)> {
        if !self.bins.has_free_slot() {
            return Err(LayoutError::NoFreeSlot(self.id.clone()));
        }
        let (column, row) = loop {
            let column = rng.next_below(self.bins.columns());
            let row = rng.next_below(self.bins.rows());
            if !self.bins.get(column, row)?.is_occupied() {
                break (column, row);
            }
        };
        self.assign_to_bin(product, column, row)?;
        Ok((column, row))
    }

    /// Take `product` out of its bin on this shelf; it drops to the
    /// floor below the bin. Unbound products are left alone.
    pub fn unassign(&mut self, product: &mut Product) -> Result<()> {
        let Some(binding) = product.binding() else {
            return Ok(());
        };
        if binding.shelf != self.id {
            return Err(LayoutError::AlreadyBound {
                product: product.name().to_string(),
                shelf: binding.shelf.clone(),
            });
        }
        self.bins.clear_content(binding.column, binding.row, product.name())?;
        product.unbind();
        let p = product.position();
        product.set_position(Vec3::new(p.x, product.floor_height(), p.z));
        debug!("shelf {}: product {} unassigned", self.id, product.name());
        Ok(())
    }

    /// Move every bin's content to follow the shelf's current transform,
    /// then drop bins whose content no longer points back here.
    pub fn reposition_all(&mut self, products: &mut Registry<Product>) -> Vec<ProductId> {
        let occupied: Vec<(usize, usize, ProductId)> = self
            .bins
            .occupied()
            .map(|(c, r, id)| (c, r, id.to_string()))
            .collect();
        for (column, row, id) in occupied {
            let Some(product) = products.get_mut(&id) else {
                continue;
            };
            let here = product
                .binding()
                .is_some_and(|b| b.shelf == self.id && b.column == column && b.row == row);
            if !here {
                continue;
            }
            if let Ok(target) = self.slot_world_position(column, row, product.height()) {
                product.set_position(target);
            }
        }
        self.bins
            .reconcile(|id| products.get(id).and_then(|p| p.binding()))
    }

    pub fn can_remove(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn snapshot(&self, dragging: bool) -> ShelfSnapshot {
        ShelfSnapshot {
            id: self.id.clone(),
            position: self.position,
            rotation: self.rotation,
            width: self.width,
            height: self.height,
            depth: self.unit.depth,
            bin_columns: self.bins.columns(),
            bin_rows: self.bins.rows(),
            bins: self.bins.snapshot(),
            dragging,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn shelf(columns: usize, rows: usize) -> ShelfLayout {
        ShelfLayout::new("S1", columns, rows, &LayoutConfig::default()).expect("valid shelf")
    }

    fn product(name: &str) -> Product {
        Product::new(name, 1.5, 1.5, 1.5).expect("valid product")
    }

    #[test]
    fn derived_dimensions() {
        let s = shelf(3, 2);
        assert_relative_eq!(s.width(), 6.0);
        assert_relative_eq!(s.height(), 4.2);
        assert_relative_eq!(s.depth(), 2.0);
        assert_eq!(s.rotation(), Rotation::Deg0);
        assert_eq!(s.bins().free_count(), 6);
    }

    #[test]
    fn rejects_empty_grid() {
        for (c, r) in [(0, 2), (2, 0), (0, 0)] {
            assert!(matches!(
                ShelfLayout::new("S", c, r, &LayoutConfig::default()),
                Err(LayoutError::InvalidDimensions(_))
            ));
        }
    }

    #[test]
    fn respects_configured_maxima() {
        let config = LayoutConfig {
            max_shelf_width: Some(5.0),
            ..LayoutConfig::default()
        };
        assert!(matches!(
            ShelfLayout::new("S", 3, 1, &config),
            Err(LayoutError::DimensionLimit(_))
        ));
        let config = LayoutConfig {
            max_shelf_height: Some(4.0),
            ..LayoutConfig::default()
        };
        assert!(ShelfLayout::new("S", 1, 2, &config).is_err());
        assert!(ShelfLayout::new("S", 1, 1, &config).is_ok());
    }

    #[test]
    fn slot_positions_follow_rotation() {
        let s = shelf(3, 2);
        let p0 = s.slot_to_local_position(0, 1, Rotation::Deg0, 1.5).expect("in range");
        assert_relative_eq!(p0.x, -2.0);
        assert_relative_eq!(p0.y, 0.2 + 0.75 + 2.0);
        assert_relative_eq!(p0.z, 0.0);

        let p90 = s.slot_to_local_position(0, 1, Rotation::Deg90, 1.5).expect("in range");
        assert_relative_eq!(p90.x, 0.0);
        assert_relative_eq!(p90.y, p0.y);
        assert_relative_eq!(p90.z, -2.0);

        assert!(s.slot_to_local_position(3, 0, Rotation::Deg0, 1.5).is_err());
    }

    #[test]
    fn assign_then_unassign_restores_empty() {
        let mut s = shelf(2, 2);
        s.set_position(Vec3::new(4.0, 0.0, -3.0));
        let mut p = product("P1");
        let at = s.assign_to_bin(&mut p, 1, 0).expect("free bin");
        assert_relative_eq!(at.x, 5.0);
        assert_relative_eq!(at.y, 0.95);
        assert_relative_eq!(at.z, -3.0);
        assert_eq!(p.binding().map(|b| (b.column, b.row)), Some((1, 0)));

        s.unassign(&mut p).expect("bound here");
        assert!(s.bins().is_empty());
        assert!(!p.is_bound());
        assert_relative_eq!(p.position().y, 0.75);
    }

    #[test]
    fn occupied_bin_leaves_everything_unchanged() {
        let mut s = shelf(2, 2);
        let mut first = product("P1");
        let mut second = product("P2");
        s.assign_to_bin(&mut first, 0, 0).expect("free bin");
        let before = second.clone();
        let err = s.assign_to_bin(&mut second, 0, 0).unwrap_err();
        assert!(matches!(err, LayoutError::BinOccupied { .. }));
        assert_eq!(second, before);
        assert_eq!(s.bins().get(0, 0).expect("in range").content(), Some("P1"));
        assert_eq!(s.bins().occupied_count(), 1);
    }

    #[test]
    fn reassigning_on_same_shelf_moves_bins() {
        let mut s = shelf(2, 2);
        let mut p = product("P1");
        s.assign_to_bin(&mut p, 0, 0).expect("free bin");
        s.assign_to_bin(&mut p, 1, 1).expect("free bin");
        assert_eq!(s.bins().occupied().collect::<Vec<_>>(), vec![(1, 1, "P1")]);
    }

    #[test]
    fn product_bound_elsewhere_is_refused() {
        let mut a = shelf(1, 1);
        let mut b = ShelfLayout::new("S2", 1, 1, &LayoutConfig::default()).expect("valid shelf");
        let mut p = product("P1");
        a.assign_to_bin(&mut p, 0, 0).expect("free bin");
        assert!(matches!(
            b.assign_to_bin(&mut p, 0, 0),
            Err(LayoutError::AlreadyBound { .. })
        ));
        assert!(b.bins().is_empty());
    }

    #[test]
    fn random_free_bin_fills_every_slot() {
        let mut s = shelf(3, 2);
        let mut rng = Pcg32::new(5, 0);
        let mut products: Vec<Product> = (0..6).map(|i| product(&format!("P{i}"))).collect();
        for p in &mut products {
            s.assign_to_random_free_bin(p, &mut rng).expect("slot left");
        }
        assert_eq!(s.bins().free_count(), 0);

        let mut extra = product("extra");
        let err = s.assign_to_random_free_bin(&mut extra, &mut rng).unwrap_err();
        assert_eq!(err, LayoutError::NoFreeSlot("S1".into()));
        assert!(!extra.is_bound());
        assert_eq!(s.bins().occupied_count(), 6);
    }

    #[test]
    fn reposition_moves_contents_with_the_shelf() {
        let mut s = shelf(2, 1);
        let mut products = Registry::new();
        let mut p = product("P1");
        s.assign_to_bin(&mut p, 0, 0).expect("free bin");
        products.insert("P1".to_string(), p).expect("fresh id");

        s.set_position(Vec3::new(10.0, 0.0, 5.0));
        s.set_rotation(Rotation::Deg90);
        let dropped = s.reposition_all(&mut products);
        assert!(dropped.is_empty());
        let moved = products.get("P1").expect("registered").position();
        assert_relative_eq!(moved.x, 10.0);
        assert_relative_eq!(moved.z, 4.0);
        assert_relative_eq!(moved.y, 0.95);
    }

    #[test]
    fn reposition_drops_orphaned_bins() {
        let mut s = shelf(2, 1);
        let mut products: Registry<Product> = Registry::new();
        let mut p = product("P1");
        s.assign_to_bin(&mut p, 1, 0).expect("free bin");
        p.unbind();
        products.insert("P1".to_string(), p).expect("fresh id");

        let dropped = s.reposition_all(&mut products);
        assert_eq!(dropped, vec!["P1".to_string()]);
        assert!(s.can_remove());
    }

    #[test]
    fn removal_requires_empty_bins() {
        let mut s = shelf(1, 2);
        assert!(s.can_remove());
        let mut p = product("P1");
        s.assign_to_bin(&mut p, 0, 1).expect("free bin");
        assert!(!s.can_remove());
    }
}
