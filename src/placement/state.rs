//! Placement session states, input events, and their outcomes.

use serde::{Deserialize, Serialize};

use crate::error::Refusal;
use crate::types::{EntityId, ProductId, Ray, Rotation, ShelfId};

/// Placement session state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum PlacementState {
    /// Nothing held
    #[default]
    Idle,

    /// A shelf follows the pointer
    DraggingShelf(ShelfId),

    /// A dropped product is being checked against the layout; only
    /// observable while a commit is being evaluated
    SelectingProduct(ProductId),

    /// An unbound product follows the pointer
    DraggingProduct(ProductId),
}

impl PlacementState {
    pub fn is_idle(&self) -> bool {
        matches!(self, PlacementState::Idle)
    }

    /// The entity currently held by the pointer, if any.
    pub fn dragged(&self) -> Option<EntityId> {
        match self {
            PlacementState::Idle => None,
            PlacementState::DraggingShelf(id) => Some(EntityId::Shelf(id.clone())),
            PlacementState::SelectingProduct(id) | PlacementState::DraggingProduct(id) => {
                Some(EntityId::Product(id.clone()))
            }
        }
    }

    /// State name for logging
    pub fn name(&self) -> &'static str {
        match self {
            PlacementState::Idle => "Idle",
            PlacementState::DraggingShelf(_) => "DraggingShelf",
            PlacementState::SelectingProduct(_) => "SelectingProduct",
            PlacementState::DraggingProduct(_) => "DraggingProduct",
        }
    }
}

/// Discrete input from the pointer and keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    /// Pick something up, or try to put it down.
    Select { ray: Ray },
    /// The pointer moved; the ray is kept for the next drag update.
    PointerMove { ray: Ray },
    RotateClockwise,
    RotateCounterclockwise,
}

/// What handling one event or request did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    /// The event had no effect in the current state.
    Ignored,
    /// An entity was picked up.
    PickedUp { entity: EntityId },
    /// A drag was committed where it stands.
    Committed { entity: EntityId },
    /// A dropped product went into a bin.
    Inserted {
        product: ProductId,
        shelf: ShelfId,
        column: usize,
        row: usize,
    },
    /// The drag continues; nothing changed.
    Refused { refusal: Refusal },
    /// The held entity followed the pointer.
    Moved { entity: EntityId },
    Rotated { shelf: ShelfId, rotation: Rotation },
    /// A drag was abandoned.
    Cancelled { entity: EntityId },
}
