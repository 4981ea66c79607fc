//! Recalculation ordering and circular reference detection.
//!
//! Starting from a changed cell, the cells reachable through `dependents`
//! edges are split into strongly connected components (Tarjan, run with an
//! explicit stack so long dependency chains cannot exhaust the call stack).
//! Components are returned in topological order: every cell comes after all
//! of its reachable precedents. A component with several members, or a
//! single cell listed among its own dependents, is a circular reference.

use std::collections::{HashMap, HashSet};

use super::{CellRef, Sheet};

/// One unit of work in a recalculation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecalcStep {
    /// Recompute this cell.
    Evaluate(CellRef),
    /// These cells reference each other; sorted.
    Cycle(Vec<CellRef>),
}

/// Plan the recalculation triggered by a change to `start`.
///
/// The first step always covers `start` itself.
pub fn plan_recalc(sheet: &Sheet, start: &CellRef) -> Vec<RecalcStep> {
    let mut components = strongly_connected(sheet, start);
    // Tarjan emits sinks first.
    components.reverse();

    components
        .into_iter()
        .map(|mut members| {
            if members.len() == 1 {
                let cell_ref = members.remove(0);
                if depends_on_itself(sheet, &cell_ref) {
                    RecalcStep::Cycle(vec![cell_ref])
                } else {
                    RecalcStep::Evaluate(cell_ref)
                }
            } else {
                members.sort();
                RecalcStep::Cycle(members)
            }
        })
        .collect()
}

fn depends_on_itself(sheet: &Sheet, cell_ref: &CellRef) -> bool {
    sheet
        .peek(cell_ref)
        .is_some_and(|cell| cell.dependents.contains(cell_ref))
}

fn successors(sheet: &Sheet, cell_ref: &CellRef) -> Vec<CellRef> {
    sheet
        .peek(cell_ref)
        .map(|cell| cell.dependents.iter().cloned().collect())
        .unwrap_or_default()
}

struct Frame {
    cell_ref: CellRef,
    successors: Vec<CellRef>,
    next: usize,
}

#[derive(Default)]
struct Tarjan {
    index: HashMap<CellRef, usize>,
    lowlink: HashMap<CellRef, usize>,
    on_stack: HashSet<CellRef>,
    stack: Vec<CellRef>,
    frames: Vec<Frame>,
    components: Vec<Vec<CellRef>>,
}

impl Tarjan {
    fn enter(&mut self, sheet: &Sheet, cell_ref: CellRef) {
        let n = self.index.len();
        self.index.insert(cell_ref.clone(), n);
        self.lowlink.insert(cell_ref.clone(), n);
        self.on_stack.insert(cell_ref.clone());
        self.stack.push(cell_ref.clone());
        self.frames.push(Frame {
            successors: successors(sheet, &cell_ref),
            cell_ref,
            next: 0,
        });
    }

    fn lower(&mut self, cell_ref: &CellRef, candidate: usize) {
        if let Some(low) = self.lowlink.get_mut(cell_ref) {
            *low = (*low).min(candidate);
        }
    }

    fn leave(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let low = self.lowlink[&frame.cell_ref];
        if let Some(parent) = self.frames.last() {
            let parent_ref = parent.cell_ref.clone();
            self.lower(&parent_ref, low);
        }
        if low == self.index[&frame.cell_ref] {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.remove(&member);
                let done = member == frame.cell_ref;
                component.push(member);
                if done {
                    break;
                }
            }
            self.components.push(component);
        }
    }
}

fn strongly_connected(sheet: &Sheet, start: &CellRef) -> Vec<Vec<CellRef>> {
    let mut tarjan = Tarjan::default();
    tarjan.enter(sheet, start.clone());

    while let Some(frame) = tarjan.frames.last_mut() {
        if frame.next == frame.successors.len() {
            tarjan.leave();
            continue;
        }
        let next = frame.successors[frame.next].clone();
        frame.next += 1;
        let current = frame.cell_ref.clone();

        match tarjan.index.get(&next) {
            None => tarjan.enter(sheet, next),
            Some(&index) if tarjan.on_stack.contains(&next) => tarjan.lower(&current, index),
            Some(_) => {}
        }
    }

    tarjan.components
}
