//! Dependency tracking.
//!
//! Every cell keeps the set of cells whose formulas mention it. After a cell's
//! content changes, [`relink`] registers the cell as a dependent of everything
//! its new formula references, vivifying those cells if needed. Under
//! [`DependencyPolicy::Prune`] it also drops the edges the old formula had and
//! the new one does not.

use gridcalc_engine::engine::{CellRef, Sheet, reference_set};

use super::state::DependencyPolicy;

/// Bring dependents edges in line with a cell's content change.
pub(crate) fn relink(
    sheet: &mut Sheet,
    cell_ref: &CellRef,
    old_formula: &str,
    new_formula: &str,
    policy: DependencyPolicy,
) {
    let current = reference_set(new_formula);

    for target in &current {
        sheet
            .get_or_create(target)
            .dependents
            .insert(cell_ref.clone());
    }

    let mut removed = 0usize;
    if policy == DependencyPolicy::Prune {
        for stale in reference_set(old_formula).difference(&current) {
            if let Some(cell) = sheet.get_mut(stale)
                && cell.dependents.remove(cell_ref)
            {
                removed += 1;
            }
        }
    }

    tracing::debug!(
        cell = %cell_ref,
        references = current.len(),
        removed,
        "relinked dependencies"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    fn assign(sheet: &mut Sheet, cell: &str, raw: &str, policy: DependencyPolicy) {
        let old = sheet
            .peek(&r(cell))
            .map(|c| c.formula.clone())
            .unwrap_or_default();
        sheet.set_raw(&r(cell), raw);
        let new = sheet.peek(&r(cell)).unwrap().formula.clone();
        relink(sheet, &r(cell), &old, &new, policy);
    }

    fn dependents(sheet: &Sheet, cell: &str) -> Vec<String> {
        sheet
            .peek(&r(cell))
            .map(|c| c.dependents.iter().map(|d| d.to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_relink_registers_dependent() {
        let mut sheet = Sheet::new("Sheet1");
        assign(&mut sheet, "B1", "=A1+1", DependencyPolicy::Prune);
        assert_eq!(dependents(&sheet, "A1"), ["B1"]);
    }

    #[test]
    fn test_relink_vivifies_referenced_cells() {
        let mut sheet = Sheet::new("Sheet1");
        assign(&mut sheet, "A1", "=Z9*2", DependencyPolicy::Prune);
        let z9 = sheet.peek(&r("Z9")).unwrap();
        assert!(z9.value.is_empty());
        assert!(!z9.is_formula());
    }

    #[test]
    fn test_relink_no_duplicate_dependents() {
        let mut sheet = Sheet::new("Sheet1");
        assign(&mut sheet, "B1", "=A1+A1", DependencyPolicy::Prune);
        assign(&mut sheet, "B1", "=A1*2", DependencyPolicy::Prune);
        assert_eq!(dependents(&sheet, "A1"), ["B1"]);
    }

    #[test]
    fn test_prune_removes_stale_edges() {
        let mut sheet = Sheet::new("Sheet1");
        assign(&mut sheet, "C1", "=A1+B1", DependencyPolicy::Prune);
        assign(&mut sheet, "C1", "=B1", DependencyPolicy::Prune);
        assert!(dependents(&sheet, "A1").is_empty());
        assert_eq!(dependents(&sheet, "B1"), ["C1"]);

        assign(&mut sheet, "C1", "42", DependencyPolicy::Prune);
        assert!(dependents(&sheet, "B1").is_empty());
    }

    #[test]
    fn test_additive_keeps_stale_edges() {
        let mut sheet = Sheet::new("Sheet1");
        assign(&mut sheet, "C1", "=A1+B1", DependencyPolicy::Additive);
        assign(&mut sheet, "C1", "=B1", DependencyPolicy::Additive);
        assert_eq!(dependents(&sheet, "A1"), ["C1"]);
    }
}
