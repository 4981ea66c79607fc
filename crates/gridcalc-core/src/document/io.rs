use super::{Document, Workbook};
use crate::error::{GridcalcError, Result};
use std::path::{Path, PathBuf};

const MAX_WORKBOOK_FILE_BYTES: u64 = 64 * 1_048_576; // 64 MiB

/// Encode a workbook as the JSON blob handed to storage.
///
/// Every cell is written with its value, formula, dependents and style, so
/// a decoded workbook needs no recalculation or relinking.
pub fn serialize_workbook(workbook: &Workbook) -> Result<String> {
    Ok(serde_json::to_string(workbook)?)
}

/// Decode a JSON blob produced by [`serialize_workbook`].
pub fn deserialize_workbook(blob: &str) -> Result<Workbook> {
    let workbook: Workbook = serde_json::from_str(blob)?;
    workbook.validate()?;
    Ok(workbook)
}

fn read_workbook_file(path: &Path) -> Result<String> {
    let meta = std::fs::metadata(path)?;
    if meta.len() > MAX_WORKBOOK_FILE_BYTES {
        return Err(GridcalcError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Refusing to read {}: workbook file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_WORKBOOK_FILE_BYTES
            ),
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}

impl Document {
    pub fn serialize_workbook(&self) -> Result<String> {
        serialize_workbook(&self.workbook)
    }

    /// Replace the workbook with a decoded blob. The current one is kept on error.
    pub fn deserialize_workbook(&mut self, blob: &str) -> Result<()> {
        self.workbook = deserialize_workbook(blob)?;
        self.clipboard = None;
        self.modified = false;
        Ok(())
    }

    /// Save to current file path.
    /// Returns the path saved to.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            return Err(GridcalcError::NoFilePath);
        };

        std::fs::write(&path, self.serialize_workbook()?)?;
        self.modified = false;
        tracing::info!(
            path = %path.display(),
            sheets = self.workbook.sheets.len(),
            "saved workbook"
        );
        Ok(path)
    }

    /// Save to a new path, which becomes the current one.
    pub fn save_as(&mut self, path: &Path) -> Result<PathBuf> {
        self.file_path = Some(path.to_path_buf());
        self.save_file()
    }

    /// Load from file
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let blob = read_workbook_file(path)?;
        self.deserialize_workbook(&blob)?;
        self.file_path = Some(path.to_path_buf());
        tracing::info!(
            path = %path.display(),
            sheets = self.workbook.sheets.len(),
            "loaded workbook"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcalc_engine::engine::{CellError, CellRef, Style, Value};

    fn r(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.on_cell_edited("Sheet1", &r("A1"), "0.1").unwrap();
        doc.on_cell_edited("Sheet1", &r("B1"), "=A1*3").unwrap();
        doc.on_cell_edited("Sheet1", &r("C1"), "=C1").unwrap();
        let mut style = Style::new();
        style.insert("italic".into(), serde_json::json!(true));
        doc.set_style("Sheet1", &r("A1"), style).unwrap();
        let second = doc.add_sheet();
        doc.on_cell_edited(&second, &r("A1"), "=1==1").unwrap();
        doc
    }

    #[test]
    fn test_blob_roundtrip_preserves_everything() {
        let doc = sample();
        let blob = doc.serialize_workbook().unwrap();
        let restored = deserialize_workbook(&blob).unwrap();
        assert_eq!(restored, doc.workbook);
        assert_eq!(restored.active_sheet, "Sheet2");

        let sheet = restored.sheet("Sheet1").unwrap();
        assert_eq!(sheet.value(&r("B1")), Some(&Value::Number(0.1 * 3.0)));
        assert_eq!(sheet.value(&r("C1")), Some(&Value::Error(CellError::Circular)));
        assert!(sheet.peek(&r("A1")).unwrap().dependents.contains(&r("B1")));
    }

    #[test]
    fn test_restored_document_keeps_propagating() {
        let blob = sample().serialize_workbook().unwrap();
        let mut doc = Document::new();
        doc.deserialize_workbook(&blob).unwrap();
        assert!(!doc.modified);

        doc.on_cell_edited("Sheet1", &r("A1"), "2").unwrap();
        assert_eq!(doc.display_value("Sheet1", &r("B1")).unwrap(), Value::Number(6.0));
    }

    #[test]
    fn test_invalid_blob_is_rejected_and_state_kept() {
        let mut doc = sample();
        assert!(matches!(
            doc.deserialize_workbook("{not json"),
            Err(GridcalcError::Json(_))
        ));
        assert!(matches!(
            doc.deserialize_workbook(r#"{"sheets":[],"active_sheet":"Sheet1"}"#),
            Err(GridcalcError::InvalidWorkbook(_))
        ));
        assert_eq!(doc.sheet_names(), ["Sheet1", "Sheet2"]);
    }

    #[test]
    fn test_save_without_path() {
        let mut doc = Document::new();
        assert!(matches!(doc.save_file(), Err(GridcalcError::NoFilePath)));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.json");

        let mut doc = sample();
        assert!(doc.modified);
        assert_eq!(doc.save_as(&path).unwrap(), path);
        assert!(!doc.modified);

        let loaded = Document::with_file(Some(path.clone()), Default::default()).unwrap();
        assert_eq!(loaded.workbook, doc.workbook);
        assert_eq!(loaded.file_path.as_deref(), Some(path.as_path()));
        assert!(!loaded.modified);
    }

    #[test]
    fn test_with_file_missing_path_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.json");
        let doc = Document::with_file(Some(path.clone()), Default::default()).unwrap();
        assert_eq!(doc.sheet_names(), ["Sheet1"]);
        assert_eq!(doc.file_path, Some(path));
    }
}
