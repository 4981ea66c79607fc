use crate::error::{GridcalcError, Result};
use gridcalc_engine::engine::Sheet;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::clipboard::Clipboard;

/// Name of the sheet a new workbook starts with.
pub const DEFAULT_SHEET: &str = "Sheet1";

/// How dependency edges are maintained when a cell's content is replaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyPolicy {
    /// Remove the cell from the dependents of cells it no longer references.
    #[default]
    Prune,
    /// Only ever add edges; stale edges accumulate.
    Additive,
}

/// Engine settings supplied by the embedding application.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineOptions {
    pub dependency_policy: DependencyPolicy,
    pub default_sheet: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            dependency_policy: DependencyPolicy::default(),
            default_sheet: DEFAULT_SHEET.to_string(),
        }
    }
}

/// All persisted state: the sheets, in creation order, and the active one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    pub active_sheet: String,
}

impl Workbook {
    pub fn new(first_sheet: &str) -> Self {
        Workbook {
            sheets: vec![Sheet::new(first_sheet)],
            active_sheet: first_sheet.to_string(),
        }
    }

    pub fn contains_sheet(&self, name: &str) -> bool {
        self.sheets.iter().any(|s| s.name == name)
    }

    pub fn sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| GridcalcError::UnknownSheet(name.to_string()))
    }

    pub fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| GridcalcError::UnknownSheet(name.to_string()))
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Check the structural invariants a loaded workbook must satisfy.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.sheets.is_empty() {
            return Err(GridcalcError::InvalidWorkbook(
                "workbook has no sheets".to_string(),
            ));
        }
        for (idx, sheet) in self.sheets.iter().enumerate() {
            if self.sheets[..idx].iter().any(|s| s.name == sheet.name) {
                return Err(GridcalcError::InvalidWorkbook(format!(
                    "duplicate sheet name '{}'",
                    sheet.name
                )));
            }
        }
        if !self.contains_sheet(&self.active_sheet) {
            return Err(GridcalcError::InvalidWorkbook(format!(
                "active sheet '{}' does not exist",
                self.active_sheet
            )));
        }
        Ok(())
    }
}

/// UI-agnostic document state for the spreadsheet.
///
/// Edits run to completion (write, relink, recalculate) before returning, so
/// callers never observe a half-propagated workbook.
pub struct Document {
    /// The persisted workbook
    pub workbook: Workbook,
    /// Engine settings
    pub options: EngineOptions,
    /// Last copied or cut cell
    pub(crate) clipboard: Option<Clipboard>,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the workbook has been modified since the last load/save
    pub modified: bool,
}

impl Document {
    /// Create a new document with default options.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Document {
            workbook: Workbook::new(&options.default_sheet),
            options,
            clipboard: None,
            file_path: None,
            modified: false,
        }
    }

    /// Create a document and load a file if provided.
    ///
    /// A path that does not exist yet becomes the save target of an empty workbook.
    pub fn with_file(path: Option<PathBuf>, options: EngineOptions) -> Result<Self> {
        let mut doc = Self::with_options(options);
        if let Some(ref p) = path {
            if p.exists() {
                doc.load_file(p)?;
            } else {
                doc.file_path = Some(p.clone());
                doc.modified = false;
            }
        }
        Ok(doc)
    }

    pub fn active_sheet(&self) -> &str {
        &self.workbook.active_sheet
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.workbook.sheet_names()
    }

    /// Make an existing sheet the active one.
    pub fn set_active_sheet(&mut self, name: &str) -> Result<()> {
        if !self.workbook.contains_sheet(name) {
            return Err(GridcalcError::UnknownSheet(name.to_string()));
        }
        self.workbook.active_sheet = name.to_string();
        self.modified = true;
        Ok(())
    }

    /// Add a sheet named `Sheet<n+1>` and make it active. Returns its name.
    pub fn add_sheet(&mut self) -> String {
        let mut n = self.workbook.sheets.len() + 1;
        let mut name = format!("Sheet{}", n);
        while self.workbook.contains_sheet(&name) {
            n += 1;
            name = format!("Sheet{}", n);
        }
        self.workbook.sheets.push(Sheet::new(&name));
        self.workbook.active_sheet = name.clone();
        self.modified = true;
        name
    }

    /// Add a sheet with a given name and make it active.
    pub fn add_sheet_named(&mut self, name: &str) -> Result<()> {
        if self.workbook.contains_sheet(name) {
            return Err(GridcalcError::DuplicateSheet(name.to_string()));
        }
        self.workbook.sheets.push(Sheet::new(name));
        self.workbook.active_sheet = name.to_string();
        self.modified = true;
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_has_one_active_sheet() {
        let doc = Document::new();
        assert_eq!(doc.sheet_names(), ["Sheet1"]);
        assert_eq!(doc.active_sheet(), "Sheet1");
        assert!(!doc.modified);
    }

    #[test]
    fn test_add_sheet_names_and_activates() {
        let mut doc = Document::new();
        assert_eq!(doc.add_sheet(), "Sheet2");
        assert_eq!(doc.active_sheet(), "Sheet2");
        assert_eq!(doc.add_sheet(), "Sheet3");
        assert_eq!(doc.sheet_names(), ["Sheet1", "Sheet2", "Sheet3"]);
    }

    #[test]
    fn test_add_sheet_skips_taken_names() {
        let mut doc = Document::new();
        doc.add_sheet_named("Sheet2").unwrap();
        assert_eq!(doc.add_sheet(), "Sheet3");
    }

    #[test]
    fn test_add_sheet_named_rejects_duplicates() {
        let mut doc = Document::new();
        assert!(matches!(
            doc.add_sheet_named("Sheet1"),
            Err(GridcalcError::DuplicateSheet(_))
        ));
    }

    #[test]
    fn test_set_active_sheet() {
        let mut doc = Document::new();
        doc.add_sheet();
        doc.set_active_sheet("Sheet1").unwrap();
        assert_eq!(doc.active_sheet(), "Sheet1");
        assert!(matches!(
            doc.set_active_sheet("Missing"),
            Err(GridcalcError::UnknownSheet(_))
        ));
    }

    #[test]
    fn test_custom_default_sheet() {
        let doc = Document::with_options(EngineOptions {
            default_sheet: "Budget".to_string(),
            ..EngineOptions::default()
        });
        assert_eq!(doc.active_sheet(), "Budget");
    }

    #[test]
    fn test_validate_rejects_missing_active_sheet() {
        let mut workbook = Workbook::new("Sheet1");
        workbook.active_sheet = "Nope".to_string();
        assert!(matches!(
            workbook.validate(),
            Err(GridcalcError::InvalidWorkbook(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let mut workbook = Workbook::new("Sheet1");
        workbook.sheets.push(Sheet::new("Sheet1"));
        assert!(workbook.validate().is_err());
    }
}
