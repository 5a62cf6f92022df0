//! Warehouse layout engine: shelves, bins, products, and the
//! interactive placement state machine that moves them.
//!
//! With the `python` feature the crate also builds a Python extension
//! exposing `run_session_json`, which takes a JSON session script and
//! returns a JSON session report.

pub mod bin_grid;
pub mod bounds;
pub mod collision;
pub mod error;
pub mod placement;
pub mod prng;
pub mod product;
pub mod registry;
pub mod session;
pub mod shelf;
pub mod types;
pub mod warehouse;

pub use error::{LayoutError, Refusal, Result};
pub use placement::{ApprovalPolicy, EventOutcome, InputEvent, LayoutEditor, PlacementState};
pub use session::{run_session, run_session_json, SessionReport, SessionScript};
pub use warehouse::Warehouse;

#[cfg(feature = "python")]
mod python {
    use pyo3::prelude::*;

    /// Replay a session script.
    ///
    /// Takes a JSON string matching `SessionScript` and returns a JSON
    /// string matching `SessionReport`.
    #[pyfunction]
    fn run_session_json(script_json: &str) -> PyResult<String> {
        crate::session::run_session_json(script_json)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))
    }

    /// Warehouse layout engine, importable from Python.
    #[pymodule]
    fn warehouse_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(run_session_json, m)?)?;
        Ok(())
    }
}
