//! Energies relative to the elemental references.

use crate::composition::Composition;
use crate::reference::ReferenceState;
use crate::table::{EnergyTable, TableEntry};

/// Fraction of each vertex element in `c`, in axis order.
pub fn frac_composition(c: &Composition, elements: &[String]) -> Vec<f64> {
    elements.iter().map(|e| c.fractional(e)).collect()
}

/// `abs_energy - Σ_e frac(e) * offset(e)`.
pub fn relative_energy(entry: &TableEntry, elements: &[String], refs: &[ReferenceState]) -> f64 {
    let sub: f64 = frac_composition(&entry.composition, elements)
        .iter()
        .zip(refs)
        .map(|(f, r)| f * r.energy)
        .sum();
    entry.abs_energy() - sub
}

/// Relative energy of every entry, in table order.
pub fn relative_energies(
    table: &EnergyTable,
    elements: &[String],
    refs: &[ReferenceState],
) -> Vec<f64> {
    table
        .iter()
        .map(|entry| relative_energy(entry, elements, refs))
        .collect()
}
