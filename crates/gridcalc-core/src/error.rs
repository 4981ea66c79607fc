//! Error types for Gridcalc core.

use thiserror::Error;

/// Errors that can occur in the Gridcalc document model
#[derive(Error, Debug)]
pub enum GridcalcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook data error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown sheet: {0}")]
    UnknownSheet(String),

    #[error("Sheet already exists: {0}")]
    DuplicateSheet(String),

    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),

    #[error("Invalid workbook: {0}")]
    InvalidWorkbook(String),

    #[error("No file path set")]
    NoFilePath,

    #[error("Clipboard is empty")]
    EmptyClipboard,
}

pub type Result<T> = std::result::Result<T, GridcalcError>;
