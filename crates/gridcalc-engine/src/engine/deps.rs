//! Dependency extraction from formula strings.
//!
//! Scans formula text for cell references (`A1`, `B12`, `AA3`) so the
//! dependency graph can be linked when a formula is assigned. Tokens are
//! one-or-more uppercase letters followed by one-or-more digits, matched
//! anywhere in the text. A token that fails strict reference validation
//! (e.g. `A0`) is simply not a reference.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use super::cell_ref::CellRef;

/// Extract all cell references from a formula, left to right, duplicates included.
///
/// A leading `=` is allowed and ignored.
pub fn extract_references(formula: &str) -> Vec<CellRef> {
    let body = formula.strip_prefix('=').unwrap_or(formula);
    cell_ref_re()
        .find_iter(body)
        .filter_map(|m| CellRef::from_str(m.as_str()))
        .collect()
}

/// The distinct set of cells a formula references.
pub fn reference_set(formula: &str) -> BTreeSet<CellRef> {
    extract_references(formula).into_iter().collect()
}

fn cell_ref_re() -> &'static Regex {
    static CELL_RE: OnceLock<Regex> = OnceLock::new();
    CELL_RE.get_or_init(|| {
        Regex::new(r"[A-Z]+[0-9]+").expect("dependency cell reference regex must compile")
    })
}
