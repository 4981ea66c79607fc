use super::Document;
use super::recalc::RecalcReport;
use crate::error::{GridcalcError, Result};
use gridcalc_engine::engine::{CellRef, Style};

/// A copied cell: its raw input and style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Clipboard {
    pub input: String,
    pub style: Style,
    /// Set by cut; the clipboard is emptied by the next paste.
    pub cut: bool,
}

impl Document {
    pub fn clipboard(&self) -> Option<&Clipboard> {
        self.clipboard.as_ref()
    }

    /// Copy a cell's input and style. Copying an unset cell copies nothing visible.
    pub fn copy_cell(&mut self, sheet: &str, cell_ref: &CellRef) -> Result<()> {
        let input = self.formula_text(sheet, cell_ref)?;
        let style = self.style(sheet, cell_ref)?.cloned().unwrap_or_default();
        self.clipboard = Some(Clipboard {
            input,
            style,
            cut: false,
        });
        Ok(())
    }

    /// Copy a cell, then clear it through the normal clear path.
    pub fn cut_cell(&mut self, sheet: &str, cell_ref: &CellRef) -> Result<RecalcReport> {
        self.copy_cell(sheet, cell_ref)?;
        if let Some(clip) = self.clipboard.as_mut() {
            clip.cut = true;
        }
        self.clear_cell(sheet, cell_ref)
    }

    /// Write the clipboard into a cell as if it had been typed, then apply the copied style.
    pub fn paste_cell(&mut self, sheet: &str, cell_ref: &CellRef) -> Result<RecalcReport> {
        let clip = self.clipboard.clone().ok_or(GridcalcError::EmptyClipboard)?;
        let report = self.on_cell_edited(sheet, cell_ref, &clip.input)?;
        self.set_style(sheet, cell_ref, clip.style)?;
        if clip.cut {
            self.clipboard = None;
        }
        Ok(report)
    }
}
