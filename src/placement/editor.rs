//! The placement state machine driving every layout mutation.

use log::{debug, info, warn};

use super::approval::{ApprovalPolicy, BinInsertion};
use super::state::{EventOutcome, InputEvent, PlacementState};
use crate::error::{LayoutError, Refusal, Result};
use crate::prng::Pcg32;
use crate::types::{
    EntityId, LayoutSnapshot, ProductId, Ray, Rotation, RotationDirection, ShelfId, Vec3,
};
use crate::warehouse::Warehouse;

/// Stream used for rejection-sampling free bins.
const BIN_STREAM: u64 = 0xB1;
const DEFAULT_SEED: u64 = 0;

/// Where a held entity came from, for `cancel`.
#[derive(Debug, Clone, Copy)]
enum DragOrigin {
    Placed { position: Vec3, rotation: Rotation },
    Added,
}

/// Placement controller
///
/// Owns the warehouse and is its only writer. Select, pointer and
/// rotate events go through `handle`; the form-driven operations
/// (add, remove, move request) are separate methods.
pub struct LayoutEditor<A: ApprovalPolicy> {
    warehouse: Warehouse,
    state: PlacementState,
    approval: A,
    /// Free-bin sampling
    rng: Pcg32,
    /// Last ray seen from the pointer
    pointer: Option<Ray>,
    origin: Option<DragOrigin>,
}

impl<A: ApprovalPolicy> LayoutEditor<A> {
    /// Seeds bin sampling from the warehouse configuration.
    pub fn new(warehouse: Warehouse, approval: A) -> Self {
        let seed = warehouse.config().approval_seed.unwrap_or(DEFAULT_SEED);
        Self::with_seed(warehouse, approval, seed)
    }

    pub fn with_seed(warehouse: Warehouse, approval: A, seed: u64) -> Self {
        Self {
            warehouse,
            state: PlacementState::Idle,
            approval,
            rng: Pcg32::new(seed, BIN_STREAM),
            pointer: None,
            origin: None,
        }
    }

    pub fn state(&self) -> &PlacementState {
        &self.state
    }

    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    pub fn approval_mut(&mut self) -> &mut A {
        &mut self.approval
    }

    pub fn is_dragging(&self, entity: &EntityId) -> bool {
        self.state.dragged().as_ref() == Some(entity)
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        self.warehouse.snapshot(&self.state)
    }

    fn set_state(&mut self, next: PlacementState) {
        if next != self.state {
            debug!("placement: {} -> {}", self.state.name(), next.name());
        }
        self.state = next;
    }

    fn release(&mut self) {
        self.set_state(PlacementState::Idle);
        self.origin = None;
    }

    fn ensure_idle(&self, what: &str) -> Result<()> {
        match self.state.dragged() {
            Some(held) => Err(LayoutError::SessionBusy(format!(
                "cannot {what} while dragging {held}"
            ))),
            None => Ok(()),
        }
    }

    // -- Events --------------------------------------------------------

    pub fn handle(&mut self, event: InputEvent) -> Result<EventOutcome> {
        match event {
            InputEvent::Select { ray } => {
                self.pointer = Some(ray);
                self.select(&ray)
            }
            InputEvent::PointerMove { ray } => {
                self.pointer = Some(ray);
                self.drag_update()
            }
            InputEvent::RotateClockwise => self.rotate(RotationDirection::Clockwise),
            InputEvent::RotateCounterclockwise => self.rotate(RotationDirection::Counterclockwise),
        }
    }

    fn select(&mut self, ray: &Ray) -> Result<EventOutcome> {
        match self.state.clone() {
            PlacementState::Idle => Ok(self.pick(ray)),
            PlacementState::DraggingShelf(id) => self.commit_shelf(id),
            PlacementState::DraggingProduct(id) => self.commit_product(id),
            PlacementState::SelectingProduct(_) => Ok(EventOutcome::Ignored),
        }
    }

    /// Shelves are tried before products; a bound product cannot be
    /// picked up directly.
    fn pick(&mut self, ray: &Ray) -> EventOutcome {
        if let Some(shelf) = self.warehouse.pick_shelf(ray) {
            let id = shelf.id().to_string();
            self.origin = Some(DragOrigin::Placed {
                position: shelf.position(),
                rotation: shelf.rotation(),
            });
            debug!("picked shelf {id}");
            self.set_state(PlacementState::DraggingShelf(id.clone()));
            return EventOutcome::PickedUp {
                entity: EntityId::Shelf(id),
            };
        }
        let Some(product) = self.warehouse.pick_product(ray) else {
            return EventOutcome::Ignored;
        };
        let id = product.name().to_string();
        if let Some(binding) = product.binding() {
            debug!("product {id} sits on shelf {}; not picked", binding.shelf);
            return EventOutcome::Ignored;
        }
        self.origin = Some(DragOrigin::Placed {
            position: product.position(),
            rotation: Rotation::Deg0,
        });
        debug!("picked product {id}");
        self.set_state(PlacementState::DraggingProduct(id.clone()));
        EventOutcome::PickedUp {
            entity: EntityId::Product(id),
        }
    }

    fn commit_shelf(&mut self, id: ShelfId) -> Result<EventOutcome> {
        let entity = EntityId::Shelf(id);
        let collisions = self.warehouse.collisions_for(&entity)?;
        if !collisions.is_empty() {
            let refusal = Refusal::Collision { with: collisions };
            warn!("{entity} not placed: {refusal}");
            return Ok(EventOutcome::Refused { refusal });
        }
        self.warehouse.clamp_all();
        info!("{entity} placed");
        self.release();
        Ok(EventOutcome::Committed { entity })
    }

    fn commit_product(&mut self, id: ProductId) -> Result<EventOutcome> {
        self.set_state(PlacementState::SelectingProduct(id.clone()));
        let outcome = self.evaluate_drop(&id);
        match outcome {
            Ok(EventOutcome::Committed { .. } | EventOutcome::Inserted { .. }) => self.release(),
            _ => self.set_state(PlacementState::DraggingProduct(id)),
        }
        outcome
    }

    /// Decide what happens to a dropped product: stay on the floor,
    /// go into the first shelf it touches, or stay in hand.
    fn evaluate_drop(&mut self, id: &str) -> Result<EventOutcome> {
        let entity = EntityId::Product(id.to_string());
        let collisions = self.warehouse.collisions_for(&entity)?;
        if collisions.is_empty() {
            info!("{entity} placed on the floor");
            return Ok(EventOutcome::Committed { entity });
        }
        let Some(shelf) = collisions.iter().find(|e| e.is_shelf()).map(|e| e.id().to_string())
        else {
            let refusal = Refusal::Collision { with: collisions };
            warn!("{entity} not placed: {refusal}");
            return Ok(EventOutcome::Refused { refusal });
        };
        if !self.warehouse.shelf(&shelf)?.bins().has_free_slot() {
            let refusal = Refusal::NoFreeSlot { shelf };
            warn!("{entity} not placed: {refusal}");
            return Ok(EventOutcome::Refused { refusal });
        }
        let request = BinInsertion {
            product: id,
            shelf: &shelf,
            bin: None,
        };
        if !self.approval.approve(&request) {
            warn!("{entity} not placed on shelf {shelf}: approval rejected");
            return Ok(EventOutcome::Refused {
                refusal: Refusal::ApprovalRejected,
            });
        }
        let (column, row) = self
            .warehouse
            .assign_to_random_free_bin(id, &shelf, &mut self.rng)?;
        Ok(EventOutcome::Inserted {
            product: id.to_string(),
            shelf,
            column,
            row,
        })
    }

    /// Move the held entity to where the last pointer ray meets the
    /// floor. Misses leave it where it is.
    fn drag_update(&mut self) -> Result<EventOutcome> {
        let Some(held) = self.state.dragged() else {
            return Ok(EventOutcome::Ignored);
        };
        let Some(hit) = self.pointer.and_then(|ray| self.warehouse.floor_hit(&ray)) else {
            return Ok(EventOutcome::Ignored);
        };
        match &held {
            EntityId::Shelf(id) => self.warehouse.move_shelf_to(id, hit.x, hit.z)?,
            EntityId::Product(id) => self.warehouse.move_product_to(id, hit.x, hit.z)?,
        };
        Ok(EventOutcome::Moved { entity: held })
    }

    /// Per-frame update: follow the pointer, then re-clamp everything.
    pub fn tick(&mut self) -> Result<()> {
        self.drag_update()?;
        self.warehouse.clamp_all();
        Ok(())
    }

    /// Quarter-turn the held shelf. Ignored unless a shelf is held.
    pub fn rotate(&mut self, direction: RotationDirection) -> Result<EventOutcome> {
        let PlacementState::DraggingShelf(id) = self.state.clone() else {
            return Ok(EventOutcome::Ignored);
        };
        match self.warehouse.rotate_shelf(&id, direction) {
            Ok(rotation) => Ok(EventOutcome::Rotated { shelf: id, rotation }),
            Err(LayoutError::PlacementRefused(refusal)) => Ok(EventOutcome::Refused { refusal }),
            Err(err) => Err(err),
        }
    }

    /// Abandon the current drag. The held entity goes back where it was
    /// picked up; one added during this drag is removed again.
    pub fn cancel(&mut self) -> Result<EventOutcome> {
        let Some(held) = self.state.dragged() else {
            return Ok(EventOutcome::Ignored);
        };
        match (&held, self.origin) {
            (EntityId::Shelf(id), Some(DragOrigin::Placed { position, rotation })) => {
                self.warehouse.place_shelf(id, position, rotation)?;
            }
            (EntityId::Product(id), Some(DragOrigin::Placed { position, .. })) => {
                self.warehouse.move_product_to(id, position.x, position.z)?;
            }
            (EntityId::Shelf(id), Some(DragOrigin::Added) | None) => {
                self.warehouse.remove_shelf(id)?;
            }
            (EntityId::Product(id), Some(DragOrigin::Added) | None) => {
                self.warehouse.remove_product(id)?;
            }
        }
        info!("drag of {held} cancelled");
        self.release();
        Ok(EventOutcome::Cancelled { entity: held })
    }

    // -- Form requests -------------------------------------------------

    /// Build a shelf at the origin and pick it up.
    pub fn add_shelf(&mut self, id: &str, bin_columns: usize, bin_rows: usize) -> Result<()> {
        self.ensure_idle("add a shelf")?;
        self.warehouse.add_shelf(id, bin_columns, bin_rows)?;
        self.origin = Some(DragOrigin::Added);
        self.set_state(PlacementState::DraggingShelf(id.to_string()));
        Ok(())
    }

    /// Create a product on the floor at the origin and pick it up.
    pub fn add_product(&mut self, name: &str, width: f64, height: f64, depth: f64) -> Result<()> {
        self.ensure_idle("add a product")?;
        self.warehouse.add_product(name, width, height, depth)?;
        self.origin = Some(DragOrigin::Added);
        self.set_state(PlacementState::DraggingProduct(name.to_string()));
        Ok(())
    }

    pub fn remove_shelf(&mut self, id: &str) -> Result<()> {
        self.warehouse.remove_shelf(id)?;
        if self.is_dragging(&EntityId::Shelf(id.to_string())) {
            self.release();
        }
        Ok(())
    }

    pub fn remove_product(&mut self, id: &str) -> Result<()> {
        self.warehouse.remove_product(id)?;
        if self.is_dragging(&EntityId::Product(id.to_string())) {
            self.release();
        }
        Ok(())
    }

    /// Take a product out of its bin and leave it on the floor below.
    pub fn unassign(&mut self, product: &str) -> Result<()> {
        self.warehouse.unassign_product(product)
    }

    /// Move a product straight into a named bin, subject to approval.
    ///
    /// The product's own collisions are not checked. The product and the
    /// destination shelf must not be held. On any failure, including a
    /// rejected approval, its current bin is kept.
    pub fn request_move(&mut self, product: &str, shelf: &str, column: usize, row: usize) -> Result<Vec3> {
        if self.is_dragging(&EntityId::Product(product.to_string())) {
            return Err(LayoutError::SessionBusy(format!(
                "product {product} is being dragged"
            )));
        }
        if self.is_dragging(&EntityId::Shelf(shelf.to_string())) {
            return Err(LayoutError::SessionBusy(format!(
                "shelf {shelf} is being dragged"
            )));
        }
        self.warehouse.check_assignment(product, shelf, column, row)?;
        let request = BinInsertion {
            product,
            shelf,
            bin: Some((column, row)),
        };
        if !self.approval.approve(&request) {
            warn!("move of product {product} to shelf {shelf} ({column}, {row}) rejected");
            return Err(LayoutError::PlacementRefused(Refusal::ApprovalRejected));
        }
        let position = self.warehouse.assign_product(product, shelf, column, row)?;
        info!("product {product} moved to shelf {shelf} ({column}, {row})");
        Ok(position)
    }
}
