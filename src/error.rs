//! Error taxonomy for layout mutations.
//!
//! Every fallible operation validates before it mutates, so an `Err`
//! never leaves a shelf, bin grid, or registry half-updated.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{EntityId, ProductId, ShelfId};

/// Why a placement attempt was turned down.
///
/// Refusals are ordinary outcomes of an interactive session: the caller
/// surfaces them as a message and the operator tries again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Refusal {
    /// The dragged entity overlaps other placed entities.
    Collision { with: Vec<EntityId> },
    /// The simulated third-party approval said no.
    ApprovalRejected,
    /// The target shelf has no empty bin left.
    NoFreeSlot { shelf: ShelfId },
    /// The rotated footprint would not fit inside the warehouse.
    DoesNotFit,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Refusal::Collision { with } => {
                write!(f, "overlaps ")?;
                for (i, id) in with.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{id}")?;
                }
                Ok(())
            }
            Refusal::ApprovalRejected => write!(f, "rejected by third-party approval"),
            Refusal::NoFreeSlot { shelf } => write!(f, "shelf {shelf} has no free bin"),
            Refusal::DoesNotFit => write!(f, "footprint does not fit inside the warehouse"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("dimension limit exceeded: {0}")]
    DimensionLimit(String),

    #[error("bin ({column}, {row}) on shelf {shelf} is already occupied")]
    BinOccupied {
        shelf: ShelfId,
        column: usize,
        row: usize,
    },

    #[error("bin ({column}, {row}) on shelf {shelf} does not hold product {product}")]
    BinMismatch {
        shelf: ShelfId,
        column: usize,
        row: usize,
        product: ProductId,
    },

    #[error("bin ({column}, {row}) is outside the {columns}x{rows} grid of shelf {shelf}")]
    InvalidBinCoordinate {
        shelf: ShelfId,
        column: usize,
        row: usize,
        columns: usize,
        rows: usize,
    },

    #[error("shelf {0} has no free bin")]
    NoFreeSlot(ShelfId),

    #[error("shelf {0} still holds products")]
    ShelfNotEmpty(ShelfId),

    #[error("unsupported rotation: {0} degrees")]
    UnsupportedRotation(f64),

    #[error("placement refused: {0}")]
    PlacementRefused(Refusal),

    #[error("id already in use: {0}")]
    DuplicateId(String),

    #[error("unknown shelf: {0}")]
    UnknownShelf(ShelfId),

    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),

    #[error("session busy: {0}")]
    SessionBusy(String),

    #[error("product {product} is bound to shelf {shelf}")]
    AlreadyBound { product: ProductId, shelf: ShelfId },
}

pub type Result<T> = std::result::Result<T, LayoutError>;
