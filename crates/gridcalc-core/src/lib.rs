//! gridcalc-core - UI-agnostic workbook document, dependency tracking and persistence.

pub mod document;
pub mod error;

pub use document::{
    Clipboard, DependencyPolicy, Document, EngineOptions, RecalcReport, Workbook, parse_cell_ref,
};
pub use error::{GridcalcError, Result};

pub use gridcalc_engine::engine::{Cell, CellError, CellRef, Style, Value};
