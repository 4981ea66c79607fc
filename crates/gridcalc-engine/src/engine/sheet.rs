//! Per-sheet cell store.
//!
//! Cells are kept in a sparse ordered map. Writes go through
//! [`Sheet::get_or_create`], which inserts an empty record for a reference
//! that has never been seen (auto-vivification). Read-only queries use
//! [`Sheet::peek`] so inspecting a sheet never grows it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::cell::{Cell, Style, Value};
use super::cell_ref::CellRef;
use super::eval::evaluate_formula;

/// A named sheet and its cells.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default)]
    cells: BTreeMap<CellRef, Cell>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Sheet {
        Sheet {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Get a cell for writing, inserting an empty record if absent.
    pub fn get_or_create(&mut self, cell_ref: &CellRef) -> &mut Cell {
        self.cells.entry(cell_ref.clone()).or_default()
    }

    /// Get a cell without creating it.
    pub fn peek(&self, cell_ref: &CellRef) -> Option<&Cell> {
        self.cells.get(cell_ref)
    }

    /// Get a cell for writing without creating it.
    pub fn get_mut(&mut self, cell_ref: &CellRef) -> Option<&mut Cell> {
        self.cells.get_mut(cell_ref)
    }

    pub fn contains(&self, cell_ref: &CellRef) -> bool {
        self.cells.contains_key(cell_ref)
    }

    /// Current value of a cell, if it has a record.
    pub fn value(&self, cell_ref: &CellRef) -> Option<&Value> {
        self.peek(cell_ref).map(|cell| &cell.value)
    }

    /// Assign raw input to a cell.
    ///
    /// Input starting with `=` becomes the formula and the value is left for
    /// recalculation to fill in. Anything else clears the formula and is
    /// stored verbatim as the value.
    pub fn set_raw(&mut self, cell_ref: &CellRef, raw: &str) {
        let cell = self.get_or_create(cell_ref);
        if raw.starts_with('=') {
            cell.formula = raw.to_string();
        } else {
            cell.formula.clear();
            cell.value = Value::from_literal(raw);
        }
    }

    /// Reset value, formula and style of an existing cell. Dependents survive.
    pub fn clear(&mut self, cell_ref: &CellRef) {
        if let Some(cell) = self.cells.get_mut(cell_ref) {
            cell.clear();
        }
    }

    pub fn set_style(&mut self, cell_ref: &CellRef, style: Style) {
        self.get_or_create(cell_ref).style = style;
    }

    /// Evaluate formula text against the current cell values.
    pub fn evaluate(&self, formula: &str) -> Value {
        evaluate_formula(formula, &|r: &CellRef| self.value(r))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
