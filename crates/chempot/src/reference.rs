//! Elemental reference states (offset energies).
//!
//! The offset of element `e` is the lowest per-atom energy among entries whose
//! reduced formula is `e` itself, i.e. the most stable elemental polymorph.

use std::collections::BTreeSet;

use crate::composition::Composition;
use crate::error::{CpdError, Result};
use crate::table::EnergyTable;

/// Chosen reference for one vertex element.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceState {
    pub element: String,
    /// Index into the table of the entry that set the offset.
    pub entry: usize,
    /// Per-atom energy of that entry.
    pub energy: f64,
}

/// Sorted, deduplicated elements over the whole table; these are the axes.
pub fn vertex_elements(table: &EnergyTable) -> Vec<String> {
    let set: BTreeSet<&str> = table
        .iter()
        .flat_map(|e| e.composition.elements())
        .collect();
    set.into_iter().map(str::to_string).collect()
}

/// One reference state per element, in the order of `elements`.
///
/// Ties keep the first entry in table order.
pub fn offset_energies(table: &EnergyTable, elements: &[String]) -> Result<Vec<ReferenceState>> {
    elements
        .iter()
        .map(|element| {
            let target = Composition::element(element).reduced_formula();
            let mut best: Option<ReferenceState> = None;
            for (i, entry) in table.iter().enumerate() {
                if entry.composition.reduced_formula() != target {
                    continue;
                }
                let e = entry.abs_energy();
                if best.as_ref().is_none_or(|b| e < b.energy) {
                    best = Some(ReferenceState {
                        element: element.clone(),
                        entry: i,
                        energy: e,
                    });
                }
            }
            best.ok_or_else(|| CpdError::MissingReference {
                element: element.clone(),
            })
        })
        .collect()
}
