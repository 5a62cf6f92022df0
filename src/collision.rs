//! Axis-aligned bounding volumes, overlap scans, and ray picking.
//!
//! Shelves only turn in quarter steps, so every volume stays axis
//! aligned and a min/max comparison per axis is exact. Scans are a
//! straight pass over the registries; layouts are hand-placed and
//! small, so there is no spatial index.

use crate::bounds::WarehouseBounds;
use crate::error::{LayoutError, Result};
use crate::product::Product;
use crate::registry::Registry;
use crate::shelf::ShelfLayout;
use crate::types::{EntityId, Ray, Vec3};

const PARALLEL_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Aabb { min, max }
    }

    pub fn from_center(center: Vec3, half: Vec3) -> Self {
        Aabb::new(center - half, center + half)
    }

    /// True if the interiors overlap.
    /// Touching (shared face, edge or corner) is NOT counted as overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
            && self.min.z < other.max.z
            && other.min.z < self.max.z
    }

    /// Distance along `ray` to the first point inside the box (slab
    /// test). A ray starting inside hits at 0.
    pub fn ray_hit(&self, ray: &Ray) -> Option<f64> {
        let axes = [
            (ray.origin.x, ray.direction.x, self.min.x, self.max.x),
            (ray.origin.y, ray.direction.y, self.min.y, self.max.y),
            (ray.origin.z, ray.direction.z, self.min.z, self.max.z),
        ];
        let mut t_near = f64::NEG_INFINITY;
        let mut t_far = f64::INFINITY;
        for (o, d, lo, hi) in axes {
            if d.abs() < PARALLEL_EPS {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let t1 = (lo - o) / d;
            let t2 = (hi - o) / d;
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
        }
        if t_far < t_near || t_far < 0.0 {
            return None;
        }
        Some(t_near.max(0.0))
    }
}

/// World-space volume of a shelf from its base position and rotation.
pub fn shelf_volume(shelf: &ShelfLayout) -> Aabb {
    let extent = shelf.footprint().oriented(shelf.rotation());
    let p = shelf.position();
    Aabb::new(
        Vec3::new(p.x - extent.width / 2.0, p.y, p.z - extent.depth / 2.0),
        Vec3::new(
            p.x + extent.width / 2.0,
            p.y + extent.height,
            p.z + extent.depth / 2.0,
        ),
    )
}

pub fn product_volume(product: &Product) -> Aabb {
    let f = product.footprint();
    Aabb::from_center(
        product.position(),
        Vec3::new(f.width / 2.0, f.height / 2.0, f.depth / 2.0),
    )
}

pub fn bounding_volume_of(
    shelves: &Registry<ShelfLayout>,
    products: &Registry<Product>,
    entity: &EntityId,
) -> Option<Aabb> {
    match entity {
        EntityId::Shelf(id) => shelves.get(id).map(shelf_volume),
        EntityId::Product(id) => products.get(id).map(product_volume),
    }
}

/// Pairs that may overlap without counting as a collision: an entity
/// with itself, and a bound product with the shelf holding it.
fn exempt(a: &EntityId, b: &EntityId, products: &Registry<Product>) -> bool {
    let holds = |shelf: &str, product: &str| {
        products
            .get(product)
            .and_then(Product::binding)
            .is_some_and(|binding| binding.shelf == shelf)
    };
    match (a, b) {
        _ if a == b => true,
        (EntityId::Shelf(s), EntityId::Product(p)) | (EntityId::Product(p), EntityId::Shelf(s)) => {
            holds(s.as_str(), p.as_str())
        }
        _ => false,
    }
}

/// Every other entity whose volume overlaps `entity`'s, shelves first,
/// each group in registry order.
pub fn collisions_for(
    shelves: &Registry<ShelfLayout>,
    products: &Registry<Product>,
    entity: &EntityId,
) -> Result<Vec<EntityId>> {
    let volume = bounding_volume_of(shelves, products, entity).ok_or_else(|| match entity {
        EntityId::Shelf(id) => LayoutError::UnknownShelf(id.clone()),
        EntityId::Product(id) => LayoutError::UnknownProduct(id.clone()),
    })?;
    let shelf_hits = shelves
        .iter()
        .map(|(id, shelf)| (EntityId::Shelf(id.clone()), shelf_volume(shelf)));
    let product_hits = products
        .iter()
        .map(|(id, product)| (EntityId::Product(id.clone()), product_volume(product)));
    Ok(shelf_hits
        .chain(product_hits)
        .filter(|(other, other_volume)| {
            !exempt(entity, other, products) && volume.overlaps(other_volume)
        })
        .map(|(other, _)| other)
        .collect())
}

/// Nearest candidate the ray passes through.
pub fn pick_nearest<'a, I>(ray: &Ray, candidates: I) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = (&'a str, Aabb)>,
{
    candidates
        .into_iter()
        .filter_map(|(id, volume)| volume.ray_hit(ray).map(|t| (id, t)))
        .fold(None, |best: Option<(&'a str, f64)>, hit| match best {
            Some(b) if b.1 <= hit.1 => Some(b),
            _ => Some(hit),
        })
}

/// Where the ray meets the warehouse floor (y = 0), if it does so
/// inside the building.
pub fn floor_hit(ray: &Ray, bounds: &WarehouseBounds) -> Option<Vec3> {
    if ray.direction.y.abs() < PARALLEL_EPS {
        return None;
    }
    let t = -ray.origin.y / ray.direction.y;
    if t < 0.0 {
        return None;
    }
    let p = ray.at(t);
    if !bounds.contains_floor_point(p.x, p.z) {
        return None;
    }
    Some(Vec3::new(p.x, 0.0, p.z))
}
