//! gridcalc_engine - Spreadsheet cell store, formula parsing and evaluation.

pub mod engine;
