//! Scripted sessions: replay a list of form and input commands against
//! a fresh editor and report what each one did.
//!
//! This is the boundary used by the Python binding and the benchmarks;
//! everything crosses it as JSON.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::placement::{
    AlwaysApprove, AlwaysReject, ApprovalPolicy, BinInsertion, EventOutcome, InputEvent,
    LayoutEditor, RandomApproval,
};
use crate::types::{LayoutConfig, LayoutSnapshot, ProductId, Ray, ShelfId, WarehouseParams};
use crate::warehouse::Warehouse;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session script: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("failed to serialize session report: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// How bin insertions are approved during a scripted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMode {
    /// Fair coin seeded from `config.approval_seed`, else the script seed.
    #[default]
    Random,
    Always,
    Never,
}

/// The policy behind an `ApprovalMode`.
#[derive(Debug, Clone)]
pub enum ScriptedApproval {
    Random(RandomApproval),
    Always(AlwaysApprove),
    Never(AlwaysReject),
}

impl ApprovalPolicy for ScriptedApproval {
    fn approve(&mut self, request: &BinInsertion<'_>) -> bool {
        match self {
            ScriptedApproval::Random(p) => p.approve(request),
            ScriptedApproval::Always(p) => p.approve(request),
            ScriptedApproval::Never(p) => p.approve(request),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    AddShelf {
        id: ShelfId,
        bin_columns: usize,
        bin_rows: usize,
    },
    AddProduct {
        name: ProductId,
        width: f64,
        height: f64,
        depth: f64,
    },
    RemoveShelf {
        id: ShelfId,
    },
    RemoveProduct {
        id: ProductId,
    },
    /// A raw pointer or keyboard event.
    Input(InputEvent),
    /// Select straight down onto floor point (x, z).
    Click {
        x: f64,
        z: f64,
    },
    /// Move the pointer straight above floor point (x, z).
    Hover {
        x: f64,
        z: f64,
    },
    MoveRequest {
        product: ProductId,
        shelf: ShelfId,
        column: usize,
        row: usize,
    },
    Unassign {
        product: ProductId,
    },
    Cancel,
    Tick,
}

fn default_seed() -> u64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionScript {
    #[serde(default)]
    pub warehouse: WarehouseParams,
    #[serde(default)]
    pub config: LayoutConfig,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub approval: ApprovalMode,
    #[serde(default)]
    pub commands: Vec<Command>,
}

/// Result of one command: an event outcome, or the error that stopped it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub index: usize,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub outcomes: Vec<CommandOutcome>,
    pub layout: LayoutSnapshot,
}

pub fn scripted_editor(script: &SessionScript) -> LayoutEditor<ScriptedApproval> {
    let approval = match script.approval {
        ApprovalMode::Random => ScriptedApproval::Random(RandomApproval::new(
            script.config.approval_seed.unwrap_or(script.seed),
        )),
        ApprovalMode::Always => ScriptedApproval::Always(AlwaysApprove),
        ApprovalMode::Never => ScriptedApproval::Never(AlwaysReject),
    };
    let warehouse = Warehouse::new_or_default(script.warehouse, script.config.clone());
    LayoutEditor::with_seed(warehouse, approval, script.seed)
}

fn apply<A: ApprovalPolicy>(
    editor: &mut LayoutEditor<A>,
    command: &Command,
) -> crate::error::Result<Option<EventOutcome>> {
    match command {
        Command::AddShelf {
            id,
            bin_columns,
            bin_rows,
        } => editor.add_shelf(id, *bin_columns, *bin_rows).map(|_| None),
        Command::AddProduct {
            name,
            width,
            height,
            depth,
        } => editor
            .add_product(name, *width, *height, *depth)
            .map(|_| None),
        Command::RemoveShelf { id } => editor.remove_shelf(id).map(|_| None),
        Command::RemoveProduct { id } => editor.remove_product(id).map(|_| None),
        Command::Input(event) => editor.handle(*event).map(Some),
        Command::Click { x, z } => editor
            .handle(InputEvent::Select {
                ray: Ray::vertical(*x, *z),
            })
            .map(Some),
        Command::Hover { x, z } => editor
            .handle(InputEvent::PointerMove {
                ray: Ray::vertical(*x, *z),
            })
            .map(Some),
        Command::MoveRequest {
            product,
            shelf,
            column,
            row,
        } => editor
            .request_move(product, shelf, *column, *row)
            .map(|_| None),
        Command::Unassign { product } => editor.unassign(product).map(|_| None),
        Command::Cancel => editor.cancel().map(Some),
        Command::Tick => editor.tick().map(|_| None),
    }
}

/// Replay `script` from an empty warehouse. Failing commands are
/// recorded and the session carries on.
pub fn run_session(script: &SessionScript) -> SessionReport {
    let mut editor = scripted_editor(script);
    let mut outcomes = Vec::with_capacity(script.commands.len());
    for (index, command) in script.commands.iter().enumerate() {
        let outcome = match apply(&mut editor, command) {
            Ok(event) => CommandOutcome {
                index,
                ok: true,
                event,
                error: None,
            },
            Err(err) => {
                warn!("command {index} failed: {err}");
                CommandOutcome {
                    index,
                    ok: false,
                    event: None,
                    error: Some(err.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }
    debug!(
        "session finished: {} commands, state {}",
        outcomes.len(),
        editor.state().name()
    );
    SessionReport {
        outcomes,
        layout: editor.snapshot(),
    }
}

/// JSON in, JSON out.
pub fn run_session_json(script_json: &str) -> Result<String, SessionError> {
    let script: SessionScript = serde_json::from_str(script_json).map_err(SessionError::Parse)?;
    let report = run_session(&script);
    serde_json::to_string(&report).map_err(SessionError::Serialize)
}
