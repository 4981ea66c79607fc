//! Document state and logic (UI-agnostic).

mod clipboard;
mod deps;
mod io;
mod ops;
mod recalc;
mod state;

pub use clipboard::Clipboard;
pub use io::{deserialize_workbook, serialize_workbook};
pub use ops::parse_cell_ref;
pub use recalc::RecalcReport;
pub use state::{DEFAULT_SHEET, DependencyPolicy, Document, EngineOptions, Workbook};
