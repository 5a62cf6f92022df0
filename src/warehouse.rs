//! The warehouse aggregate: envelope, configuration, and every placed
//! shelf and product.
//!
//! All layout mutations go through here so bin grids and the products'
//! back-references stay in step. Each operation validates against the
//! current model before touching it.

use log::{debug, info, warn};

use crate::bounds::{clamp, ClampKind, ClampRange, WarehouseBounds};
use crate::collision::{self, pick_nearest, product_volume, shelf_volume};
use crate::error::{LayoutError, Refusal, Result};
use crate::placement::PlacementState;
use crate::prng::Pcg32;
use crate::product::Product;
use crate::registry::Registry;
use crate::shelf::ShelfLayout;
use crate::types::{
    EntityId, LayoutConfig, LayoutSnapshot, Ray, Rotation, RotationDirection, Vec3,
    WarehouseParams,
};

#[derive(Debug, Clone)]
pub struct Warehouse {
    bounds: WarehouseBounds,
    config: LayoutConfig,
    shelves: Registry<ShelfLayout>,
    products: Registry<Product>,
}

fn shelf_range(bounds: &WarehouseBounds, shelf: &ShelfLayout) -> ClampRange {
    bounds.clamp_range(shelf.footprint(), shelf.rotation(), ClampKind::Shelf)
}

fn product_range(bounds: &WarehouseBounds, config: &LayoutConfig, product: &Product) -> ClampRange {
    let kind = if product.is_bound() {
        ClampKind::BoundProduct {
            y: product.position().y,
        }
    } else {
        ClampKind::FloorProduct {
            ceiling: config.product_ceiling,
        }
    };
    bounds.clamp_range(product.footprint(), Rotation::Deg0, kind)
}

fn unknown_shelf(id: &str) -> LayoutError {
    LayoutError::UnknownShelf(id.to_string())
}

fn unknown_product(id: &str) -> LayoutError {
    LayoutError::UnknownProduct(id.to_string())
}

impl Warehouse {
    pub fn new(params: WarehouseParams, config: LayoutConfig) -> Result<Self> {
        let bounds = WarehouseBounds::new(params, &config)?;
        Ok(Self::with_bounds(bounds, config))
    }

    /// Like `new`, but an invalid envelope falls back to the default one.
    pub fn new_or_default(params: WarehouseParams, config: LayoutConfig) -> Self {
        match WarehouseBounds::new(params, &config) {
            Ok(bounds) => Self::with_bounds(bounds, config),
            Err(err) => {
                let fallback = WarehouseBounds::default();
                warn!(
                    "{err}; using the default {} x {} x {} warehouse",
                    fallback.width(),
                    fallback.height(),
                    fallback.depth()
                );
                Self::with_bounds(fallback, config)
            }
        }
    }

    fn with_bounds(bounds: WarehouseBounds, config: LayoutConfig) -> Self {
        Self {
            bounds,
            config,
            shelves: Registry::new(),
            products: Registry::new(),
        }
    }

    pub fn bounds(&self) -> &WarehouseBounds {
        &self.bounds
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn shelves(&self) -> &Registry<ShelfLayout> {
        &self.shelves
    }

    pub fn products(&self) -> &Registry<Product> {
        &self.products
    }

    pub fn shelf(&self, id: &str) -> Result<&ShelfLayout> {
        self.shelves.get(id).ok_or_else(|| unknown_shelf(id))
    }

    pub fn product(&self, id: &str) -> Result<&Product> {
        self.products.get(id).ok_or_else(|| unknown_product(id))
    }

    pub fn contains(&self, entity: &EntityId) -> bool {
        match entity {
            EntityId::Shelf(id) => self.shelves.contains(id),
            EntityId::Product(id) => self.products.contains(id),
        }
    }

    // -- Registry ------------------------------------------------------

    /// Build a shelf at the origin. Its footprint must fit the building.
    pub fn add_shelf(&mut self, id: &str, bin_columns: usize, bin_rows: usize) -> Result<&ShelfLayout> {
        if self.shelves.contains(id) {
            return Err(LayoutError::DuplicateId(format!("shelf {id}")));
        }
        // Size check comes before the bin grid is allocated.
        let footprint = ShelfLayout::footprint_for(bin_columns, bin_rows, &self.config);
        if !self.bounds.fits_footprint(footprint) {
            return Err(LayoutError::DimensionLimit(format!(
                "shelf {id}: {} x {} x {} does not fit the warehouse",
                footprint.width, footprint.height, footprint.depth
            )));
        }
        let shelf = ShelfLayout::new(id, bin_columns, bin_rows, &self.config)?;
        self.shelves
            .insert(id.to_string(), shelf)
            .map_err(|_| LayoutError::DuplicateId(format!("shelf {id}")))?;
        info!("added shelf {id} ({bin_columns} x {bin_rows} bins)");
        self.shelf(id)
    }

    /// Create a product resting on the floor at the origin.
    pub fn add_product(&mut self, name: &str, width: f64, height: f64, depth: f64) -> Result<&Product> {
        if self.products.contains(name) {
            return Err(LayoutError::DuplicateId(format!("product {name}")));
        }
        let product = Product::new(name, width, height, depth)?;
        if !self.bounds.fits_footprint(product.footprint()) {
            return Err(LayoutError::DimensionLimit(format!(
                "product {name}: {width} x {height} x {depth} does not fit the warehouse"
            )));
        }
        self.products
            .insert(name.to_string(), product)
            .map_err(|_| LayoutError::DuplicateId(format!("product {name}")))?;
        info!("added product {name}");
        self.product(name)
    }

    /// Remove an empty shelf. A shelf holding products stays put.
    pub fn remove_shelf(&mut self, id: &str) -> Result<ShelfLayout> {
        let shelf = self.shelf(id)?;
        if !shelf.can_remove() {
            warn!(
                "shelf {id} still holds {} product(s); not removed",
                shelf.bins().occupied_count()
            );
            return Err(LayoutError::ShelfNotEmpty(id.to_string()));
        }
        let removed = self.shelves.remove(id).ok_or_else(|| unknown_shelf(id))?;
        info!("removed shelf {id}");
        Ok(removed)
    }

    /// Remove a product, emptying its bin first.
    pub fn remove_product(&mut self, id: &str) -> Result<Product> {
        self.unassign_product(id)?;
        let removed = self.products.remove(id).ok_or_else(|| unknown_product(id))?;
        info!("removed product {id}");
        Ok(removed)
    }

    // -- Bin assignment ------------------------------------------------

    /// Check that `product` could go into bin (column, row) of `shelf`
    /// without changing anything.
    pub fn check_assignment(&self, product: &str, shelf: &str, column: usize, row: usize) -> Result<()> {
        self.product(product)?;
        let bin = self.shelf(shelf)?.bins().get(column, row)?;
        match bin.content() {
            Some(holder) if holder != product => Err(LayoutError::BinOccupied {
                shelf: shelf.to_string(),
                column,
                row,
            }),
            _ => Ok(()),
        }
    }

    /// Put a product into a specific bin, releasing any bin it held on
    /// another shelf. Returns the product's new world position.
    pub fn assign_product(&mut self, product: &str, shelf: &str, column: usize, row: usize) -> Result<Vec3> {
        self.check_assignment(product, shelf, column, row)?;
        let current = self.product(product)?;
        if let Some(b) = current.binding() {
            if b.shelf == shelf && b.column == column && b.row == row {
                return Ok(current.position());
            }
            if b.shelf != shelf {
                self.unassign_product(product)?;
            }
        }
        let p = self.products.get_mut(product).ok_or_else(|| unknown_product(product))?;
        let s = self.shelves.get_mut(shelf).ok_or_else(|| unknown_shelf(shelf))?;
        let target = s.assign_to_bin(p, column, row)?;
        info!("product {product} assigned to shelf {shelf} bin ({column}, {row})");
        Ok(target)
    }

    /// Put a product into any free bin of `shelf`.
    pub fn assign_to_random_free_bin(
        &mut self,
        product: &str,
        shelf: &str,
        rng: &mut Pcg32,
    ) -> Result<(usize, usize)> {
        let bound_elsewhere = self
            .product(product)?
            .binding()
            .is_some_and(|b| b.shelf != shelf);
        if !self.shelf(shelf)?.bins().has_free_slot() {
            return Err(LayoutError::NoFreeSlot(shelf.to_string()));
        }
        if bound_elsewhere {
            self.unassign_product(product)?;
        }
        let p = self.products.get_mut(product).ok_or_else(|| unknown_product(product))?;
        let s = self.shelves.get_mut(shelf).ok_or_else(|| unknown_shelf(shelf))?;
        let (column, row) = s.assign_to_random_free_bin(p, rng)?;
        info!("product {product} inserted into shelf {shelf} bin ({column}, {row})");
        Ok((column, row))
    }

    /// Take a product out of its bin; unbound products are left alone.
    pub fn unassign_product(&mut self, product: &str) -> Result<()> {
        let p = self.products.get_mut(product).ok_or_else(|| unknown_product(product))?;
        let Some(shelf) = p.binding().map(|b| b.shelf.clone()) else {
            return Ok(());
        };
        let s = self.shelves.get_mut(&shelf).ok_or_else(|| unknown_shelf(&shelf))?;
        s.unassign(p)
    }

    // -- Geometry ------------------------------------------------------

    pub fn collisions_for(&self, entity: &EntityId) -> Result<Vec<EntityId>> {
        collision::collisions_for(&self.shelves, &self.products, entity)
    }

    pub fn clamp_range_for(&self, entity: &EntityId) -> Result<ClampRange> {
        match entity {
            EntityId::Shelf(id) => Ok(shelf_range(&self.bounds, self.shelf(id)?)),
            EntityId::Product(id) => Ok(product_range(&self.bounds, &self.config, self.product(id)?)),
        }
    }

    /// Slide a shelf to (x, z), clamped to the building. Bin contents
    /// travel with it.
    pub fn move_shelf_to(&mut self, id: &str, x: f64, z: f64) -> Result<Vec3> {
        let shelf = self.shelves.get_mut(id).ok_or_else(|| unknown_shelf(id))?;
        let range = shelf_range(&self.bounds, shelf);
        let target = clamp(Vec3::new(x, shelf.position().y, z), &range);
        shelf.set_position(target);
        shelf.reposition_all(&mut self.products);
        Ok(target)
    }

    /// Slide an unbound product to (x, z), clamped to the building.
    pub fn move_product_to(&mut self, id: &str, x: f64, z: f64) -> Result<Vec3> {
        let product = self.products.get_mut(id).ok_or_else(|| unknown_product(id))?;
        if let Some(b) = product.binding() {
            return Err(LayoutError::AlreadyBound {
                product: id.to_string(),
                shelf: b.shelf.clone(),
            });
        }
        let range = product_range(&self.bounds, &self.config, product);
        let target = clamp(Vec3::new(x, product.position().y, z), &range);
        product.set_position(target);
        Ok(target)
    }

    /// Put a shelf back at an earlier position and rotation.
    pub fn place_shelf(&mut self, id: &str, position: Vec3, rotation: Rotation) -> Result<()> {
        let shelf = self.shelves.get_mut(id).ok_or_else(|| unknown_shelf(id))?;
        shelf.set_rotation(rotation);
        let range = shelf_range(&self.bounds, shelf);
        shelf.set_position(clamp(position, &range));
        shelf.reposition_all(&mut self.products);
        Ok(())
    }

    /// Quarter-turn a shelf in place and pull it back inside the walls.
    ///
    /// A turn whose footprint cannot fit the building at all is refused
    /// with `DoesNotFit` and the shelf keeps its rotation.
    pub fn rotate_shelf(&mut self, id: &str, direction: RotationDirection) -> Result<Rotation> {
        let shelf = self.shelves.get_mut(id).ok_or_else(|| unknown_shelf(id))?;
        let next = shelf.rotation().rotated(direction);
        if !self.bounds.fits_footprint(shelf.footprint().oriented(next)) {
            warn!("shelf {id} does not fit the warehouse at {} degrees", next.degrees());
            return Err(LayoutError::PlacementRefused(Refusal::DoesNotFit));
        }
        shelf.rotate(direction);
        let range = shelf_range(&self.bounds, shelf);
        shelf.set_position(clamp(shelf.position(), &range));
        shelf.reposition_all(&mut self.products);
        debug!("shelf {id} rotated to {} degrees", next.degrees());
        Ok(next)
    }

    /// Re-clamp everything. Bound products follow their shelves.
    pub fn clamp_all(&mut self) {
        for (_, shelf) in self.shelves.iter_mut() {
            let range = shelf_range(&self.bounds, shelf);
            shelf.set_position(clamp(shelf.position(), &range));
            shelf.reposition_all(&mut self.products);
        }
        for (_, product) in self.products.iter_mut() {
            if product.is_bound() {
                continue;
            }
            let range = product_range(&self.bounds, &self.config, product);
            product.set_position(clamp(product.position(), &range));
        }
    }

    // -- Picking -------------------------------------------------------

    pub fn floor_hit(&self, ray: &Ray) -> Option<Vec3> {
        collision::floor_hit(ray, &self.bounds)
    }

    /// Nearest shelf under the ray.
    pub fn pick_shelf(&self, ray: &Ray) -> Option<&ShelfLayout> {
        let volumes = self.shelves.iter().map(|(id, s)| (id.as_str(), shelf_volume(s)));
        let (id, _) = pick_nearest(ray, volumes)?;
        self.shelves.get(id)
    }

    /// Nearest product under the ray, bound or not.
    pub fn pick_product(&self, ray: &Ray) -> Option<&Product> {
        let volumes = self.products.iter().map(|(id, p)| (id.as_str(), product_volume(p)));
        let (id, _) = pick_nearest(ray, volumes)?;
        self.products.get(id)
    }

    // -- Snapshot ------------------------------------------------------

    pub fn snapshot(&self, session: &PlacementState) -> LayoutSnapshot {
        let dragged = session.dragged();
        let is_dragged = |entity: EntityId| dragged.as_ref() == Some(&entity);
        LayoutSnapshot {
            warehouse: self.bounds.params(),
            shelves: self
                .shelves
                .iter()
                .map(|(id, s)| s.snapshot(is_dragged(EntityId::Shelf(id.clone()))))
                .collect(),
            products: self
                .products
                .iter()
                .map(|(id, p)| p.snapshot(is_dragged(EntityId::Product(id.clone()))))
                .collect(),
            session: session.clone(),
        }
    }
}
