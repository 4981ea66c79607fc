//! Spreadsheet engine API.
//!
//! This module provides the core computation engine for the spreadsheet:
//!
//! - [`Sheet`] - Per-sheet cell store with auto-vivifying writes
//! - [`Cell`], [`Value`], [`CellError`], [`Style`] - Cell records
//! - [`CellRef`] - Cell reference parsing (A1 notation ↔ row/col indices)
//! - [`extract_references`] - Find the cells a formula mentions
//! - [`parse_formula`] - Parse formula text into an [`Expr`] tree
//! - [`evaluate_formula`] - Evaluate a formula against resolved cell values
//! - [`plan_recalc`] - Topological recalculation order with cycle detection
//! - [`format_number`] - Format numbers for display

mod cell;
mod cell_ref;
mod cycle;
mod deps;
mod error;
mod eval;
mod format;
mod parser;
mod sheet;

pub use cell::{Cell, CellError, Style, Value};
pub use cell_ref::CellRef;
pub use cycle::{RecalcStep, plan_recalc};
pub use deps::{extract_references, reference_set};
pub use error::FormulaError;
pub use eval::{evaluate, evaluate_formula};
pub use format::format_number;
pub use parser::{BinaryOp, Expr, MAX_NESTING, UnaryOp, parse_formula};
pub use sheet::Sheet;
