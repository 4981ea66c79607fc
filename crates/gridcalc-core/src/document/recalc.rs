//! Recalculation propagation.
//!
//! A change to one cell recomputes every formula reachable from it through
//! dependents edges, each exactly once and after its precedents. Cells on a
//! circular reference are marked `#CYCLE!` instead of being evaluated.

use gridcalc_engine::engine::{CellError, CellRef, RecalcStep, Sheet, Value, plan_recalc};

/// Outcome of one propagation pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecalcReport {
    /// Cells whose value changed, in processing order. The edited cell is
    /// always included.
    pub changed: Vec<(CellRef, Value)>,
    /// Formula cells found on a circular reference.
    pub cycles: Vec<CellRef>,
    /// Number of formulas evaluated.
    pub evaluated: usize,
}

impl RecalcReport {
    /// New value of a cell if this pass changed it.
    pub fn value_of(&self, cell_ref: &CellRef) -> Option<&Value> {
        self.changed
            .iter()
            .find(|(r, _)| r == cell_ref)
            .map(|(_, v)| v)
    }

    pub fn had_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }
}

/// Recompute `start` (if it holds a formula) and everything that depends on it.
pub(crate) fn recalculate(sheet: &mut Sheet, start: &CellRef) -> RecalcReport {
    let mut report = RecalcReport::default();

    for step in plan_recalc(sheet, start) {
        match step {
            RecalcStep::Evaluate(cell_ref) => {
                let formula = match sheet.peek(&cell_ref) {
                    Some(cell) if cell.is_formula() => cell.formula.clone(),
                    Some(cell) => {
                        if cell_ref == *start {
                            report.changed.push((cell_ref, cell.value.clone()));
                        }
                        continue;
                    }
                    None => continue,
                };
                let value = sheet.evaluate(&formula);
                report.evaluated += 1;
                tracing::trace!(cell = %cell_ref, %formula, %value, "evaluated");
                store(sheet, cell_ref, value, start, &mut report);
            }
            RecalcStep::Cycle(members) => {
                tracing::warn!(
                    cells = ?members.iter().map(|m| m.to_string()).collect::<Vec<_>>(),
                    "circular reference"
                );
                for cell_ref in members {
                    if !sheet.peek(&cell_ref).is_some_and(|c| c.is_formula()) {
                        continue;
                    }
                    report.cycles.push(cell_ref.clone());
                    let value = Value::Error(CellError::Circular);
                    store(sheet, cell_ref, value, start, &mut report);
                }
            }
        }
    }

    report
}

fn store(
    sheet: &mut Sheet,
    cell_ref: CellRef,
    value: Value,
    start: &CellRef,
    report: &mut RecalcReport,
) {
    let cell = sheet.get_or_create(&cell_ref);
    if cell.value != value || cell_ref == *start {
        report.changed.push((cell_ref, value.clone()));
    }
    cell.value = value;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::deps::relink;
    use crate::document::state::DependencyPolicy;

    fn r(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    fn edit(sheet: &mut Sheet, cell: &str, raw: &str) -> RecalcReport {
        let old = sheet
            .peek(&r(cell))
            .map(|c| c.formula.clone())
            .unwrap_or_default();
        sheet.set_raw(&r(cell), raw);
        let new = sheet.peek(&r(cell)).unwrap().formula.clone();
        relink(sheet, &r(cell), &old, &new, DependencyPolicy::Prune);
        recalculate(sheet, &r(cell))
    }

    fn value(sheet: &Sheet, cell: &str) -> Value {
        sheet.value(&r(cell)).cloned().unwrap_or_default()
    }

    #[test]
    fn test_propagates_to_dependents() {
        let mut sheet = Sheet::new("Sheet1");
        edit(&mut sheet, "A1", "2");
        edit(&mut sheet, "B1", "=A1*3");
        assert_eq!(value(&sheet, "B1"), Value::Number(6.0));

        let report = edit(&mut sheet, "A1", "5");
        assert_eq!(value(&sheet, "B1"), Value::Number(15.0));
        assert_eq!(
            report.changed,
            vec![
                (r("A1"), Value::Text("5".to_string())),
                (r("B1"), Value::Number(15.0)),
            ]
        );
    }

    #[test]
    fn test_diamond_evaluates_each_cell_once_in_order() {
        let mut sheet = Sheet::new("Sheet1");
        edit(&mut sheet, "A1", "1");
        edit(&mut sheet, "B1", "=A1+1");
        edit(&mut sheet, "C1", "=A1*10");
        edit(&mut sheet, "D1", "=B1+C1");
        assert_eq!(value(&sheet, "D1"), Value::Number(12.0));

        let report = edit(&mut sheet, "A1", "2");
        assert_eq!(report.evaluated, 3);
        assert_eq!(value(&sheet, "D1"), Value::Number(23.0));
    }

    #[test]
    fn test_unchanged_values_are_not_reported() {
        let mut sheet = Sheet::new("Sheet1");
        edit(&mut sheet, "A1", "3");
        edit(&mut sheet, "B1", "=A1>0");
        let report = edit(&mut sheet, "A1", "4");
        assert_eq!(report.changed.len(), 1);
        assert_eq!(report.evaluated, 1);
    }

    #[test]
    fn test_cycle_marks_members_and_terminates() {
        let mut sheet = Sheet::new("Sheet1");
        edit(&mut sheet, "A1", "=B1");
        let report = edit(&mut sheet, "B1", "=A1");

        assert_eq!(report.cycles, vec![r("A1"), r("B1")]);
        assert_eq!(value(&sheet, "A1"), Value::Error(CellError::Circular));
        assert_eq!(value(&sheet, "B1"), Value::Error(CellError::Circular));
    }

    #[test]
    fn test_edited_cycle_member_is_reported() {
        let mut sheet = Sheet::new("Sheet1");
        edit(&mut sheet, "A1", "=B1");
        let report = edit(&mut sheet, "B1", "=A1");
        assert_eq!(report.value_of(&r("B1")), Some(&Value::Error(CellError::Circular)));

        // Re-entering the same cyclic formula changes nothing but the edited cell.
        let report = edit(&mut sheet, "B1", "=A1");
        assert_eq!(report.changed, vec![(r("B1"), Value::Error(CellError::Circular))]);
    }

    #[test]
    fn test_cycle_downstream_gets_error() {
        let mut sheet = Sheet::new("Sheet1");
        edit(&mut sheet, "C1", "=B1+1");
        edit(&mut sheet, "A1", "=B1");
        edit(&mut sheet, "B1", "=A1");
        assert_eq!(value(&sheet, "C1"), Value::Error(CellError::Eval));
    }

    #[test]
    fn test_breaking_cycle_recovers() {
        let mut sheet = Sheet::new("Sheet1");
        edit(&mut sheet, "A1", "=B1");
        edit(&mut sheet, "B1", "=A1");
        let report = edit(&mut sheet, "B1", "5");

        assert!(!report.had_cycles());
        assert_eq!(value(&sheet, "A1"), Value::Number(5.0));
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let mut sheet = Sheet::new("Sheet1");
        edit(&mut sheet, "A1", "=A1+1");
        assert_eq!(value(&sheet, "A1"), Value::Error(CellError::Circular));
    }

    #[test]
    fn test_value_of() {
        let mut sheet = Sheet::new("Sheet1");
        let report = edit(&mut sheet, "A1", "=2+2");
        assert_eq!(report.value_of(&r("A1")), Some(&Value::Number(4.0)));
        assert_eq!(report.value_of(&r("B1")), None);
    }
}
