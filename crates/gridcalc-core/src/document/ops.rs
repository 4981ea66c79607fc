use super::Document;
use super::deps::relink;
use super::recalc::{RecalcReport, recalculate};
use crate::error::{GridcalcError, Result};
use gridcalc_engine::engine::{Cell, CellRef, Style, Value};

/// Parse user-supplied A1 notation into a cell reference.
pub fn parse_cell_ref(text: &str) -> Result<CellRef> {
    CellRef::from_str(text.trim()).ok_or_else(|| GridcalcError::InvalidCellRef(text.to_string()))
}

impl Document {
    /// Apply raw input to a cell and propagate the change.
    ///
    /// Input starting with `=` is a formula; anything else is a literal.
    /// Formula failures are stored as error values, never returned.
    pub fn on_cell_edited(
        &mut self,
        sheet: &str,
        cell_ref: &CellRef,
        input: &str,
    ) -> Result<RecalcReport> {
        let policy = self.options.dependency_policy;
        let sheet = self.workbook.sheet_mut(sheet)?;

        let old_formula = sheet
            .peek(cell_ref)
            .map(|c| c.formula.clone())
            .unwrap_or_default();
        sheet.set_raw(cell_ref, input);
        let new_formula = sheet
            .peek(cell_ref)
            .map(|c| c.formula.clone())
            .unwrap_or_default();

        relink(sheet, cell_ref, &old_formula, &new_formula, policy);
        let report = recalculate(sheet, cell_ref);
        tracing::debug!(
            sheet = %sheet.name,
            cell = %cell_ref,
            changed = report.changed.len(),
            evaluated = report.evaluated,
            "cell edited"
        );

        self.modified = true;
        Ok(report)
    }

    /// Set cell contents from input on the active sheet.
    pub fn set_cell_from_input(&mut self, cell_ref: &CellRef, input: &str) -> Result<RecalcReport> {
        let sheet = self.workbook.active_sheet.clone();
        self.on_cell_edited(&sheet, cell_ref, input)
    }

    /// Clear value, formula and style of a cell and propagate the change.
    ///
    /// The cell keeps its dependents, so formulas that read it see an empty
    /// value now and are notified when it is written again.
    pub fn clear_cell(&mut self, sheet: &str, cell_ref: &CellRef) -> Result<RecalcReport> {
        let policy = self.options.dependency_policy;
        let sheet = self.workbook.sheet_mut(sheet)?;
        let Some(old_formula) = sheet.peek(cell_ref).map(|c| c.formula.clone()) else {
            return Ok(RecalcReport::default());
        };

        sheet.clear(cell_ref);
        relink(sheet, cell_ref, &old_formula, "", policy);
        let report = recalculate(sheet, cell_ref);

        self.modified = true;
        Ok(report)
    }

    /// The cell record, without creating it.
    pub fn cell(&self, sheet: &str, cell_ref: &CellRef) -> Result<Option<&Cell>> {
        Ok(self.workbook.sheet(sheet)?.peek(cell_ref))
    }

    /// Value to render for a cell. Unset cells are empty.
    pub fn display_value(&self, sheet: &str, cell_ref: &CellRef) -> Result<Value> {
        Ok(self
            .cell(sheet, cell_ref)?
            .map(|c| c.value.clone())
            .unwrap_or_default())
    }

    /// Text for the formula bar: the formula if present, else the literal value.
    pub fn formula_text(&self, sheet: &str, cell_ref: &CellRef) -> Result<String> {
        Ok(self
            .cell(sheet, cell_ref)?
            .map(Cell::to_input_string)
            .unwrap_or_default())
    }

    /// Stored style of a cell, returned verbatim.
    pub fn style(&self, sheet: &str, cell_ref: &CellRef) -> Result<Option<&Style>> {
        Ok(self.cell(sheet, cell_ref)?.map(|c| &c.style))
    }

    /// Replace a cell's style. Creates the cell record if needed.
    pub fn set_style(&mut self, sheet: &str, cell_ref: &CellRef, style: Style) -> Result<()> {
        self.workbook.sheet_mut(sheet)?.set_style(cell_ref, style);
        self.modified = true;
        Ok(())
    }

    /// Remove all formatting from a cell.
    pub fn clear_style(&mut self, sheet: &str, cell_ref: &CellRef) -> Result<()> {
        if let Some(cell) = self.workbook.sheet_mut(sheet)?.get_mut(cell_ref) {
            cell.style.clear();
            self.modified = true;
        }
        Ok(())
    }
}
