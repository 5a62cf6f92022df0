//! Interactive placement: select, drag, rotate, commit, and cancel.
//!
//! The `LayoutEditor` is the single writer of the layout. Input events
//! arrive one at a time; each is handled to completion before the next,
//! and `tick` runs the continuous drag update between them.

mod approval;
mod editor;
mod state;

pub use approval::{AlwaysApprove, AlwaysReject, ApprovalPolicy, BinInsertion, RandomApproval};
pub use editor::LayoutEditor;
pub use state::{EventOutcome, InputEvent, PlacementState};
