//! Cell data structures for the spreadsheet grid.
//!
//! This module provides the core data types for representing cells:
//! - [`Value`] - The displayed/computed scalar held by a cell
//! - [`CellError`] - Error markers stored in place of a value
//! - [`Style`] - Opaque formatting attributes, passed through untouched
//! - [`Cell`] - A cell record with value, formula, dependents and style

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::cell_ref::CellRef;
use super::format::format_number;

/// Opaque formatting attributes (bold, colors, alignment, ...).
pub type Style = serde_json::Map<String, serde_json::Value>;

/// Error markers a cell can hold instead of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellError {
    /// The formula could not be computed.
    Eval,
    /// The cell is part of a circular reference.
    Circular,
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellError::Eval => f.write_str("ERROR"),
            CellError::Circular => f.write_str("#CYCLE!"),
        }
    }
}

/// The current scalar of a cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Error(CellError),
}

impl Value {
    /// Literal (non-formula) input is kept verbatim.
    pub fn from_literal(input: &str) -> Value {
        if input.is_empty() {
            Value::Empty
        } else {
            Value::Text(input.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Text(s) => f.write_str(s),
            Value::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Value::Error(e) => e.fmt(f),
        }
    }
}

/// A cell record.
///
/// `formula` is empty for literal cells, otherwise it starts with `=`.
/// `dependents` lists the cells whose formulas mention this cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub formula: String,
    #[serde(default)]
    pub dependents: BTreeSet<CellRef>,
    #[serde(default)]
    pub style: Style,
}

impl Cell {
    pub fn is_formula(&self) -> bool {
        !self.formula.is_empty()
    }

    /// Text for the formula bar: the formula if present, else the literal value.
    pub fn to_input_string(&self) -> String {
        if self.is_formula() {
            self.formula.clone()
        } else {
            self.value.to_string()
        }
    }

    /// Reset content and style. Dependents are kept so cells that reference
    /// this one are still notified when it is written again.
    pub fn clear(&mut self) {
        self.value = Value::Empty;
        self.formula.clear();
        self.style.clear();
    }
}
