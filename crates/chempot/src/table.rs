//! Energy table: compositions with absolute energies per formula unit.
//!
//! Insertion order is kept and defines the order of stability half-spaces and
//! of the per-compound facet lookup. Re-inserting a composition replaces its
//! energy in place (map semantics on the canonical key).

use std::collections::HashMap;

use crate::composition::Composition;
use crate::error::{CpdError, FormulaError, Result};

/// One table row.
#[derive(Clone, Debug, PartialEq)]
pub struct TableEntry {
    pub composition: Composition,
    /// Absolute energy per formula unit.
    pub energy: f64,
}

impl TableEntry {
    /// Energy per atom.
    #[inline]
    pub fn abs_energy(&self) -> f64 {
        self.energy / f64::from(self.composition.num_atoms())
    }
}

#[derive(Clone, Debug, Default)]
pub struct EnergyTable {
    entries: Vec<TableEntry>,
    index: HashMap<Composition, usize>,
}

impl EnergyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Empty compositions and non-finite energies are rejected.
    pub fn insert(&mut self, composition: Composition, energy: f64) -> Result<()> {
        if composition.is_empty() {
            return Err(FormulaError::Empty.into());
        }
        if !energy.is_finite() {
            return Err(CpdError::NonFiniteEnergy {
                formula: composition.formula(),
            });
        }
        match self.index.get(&composition) {
            Some(&i) => self.entries[i].energy = energy,
            None => {
                self.index.insert(composition.clone(), self.entries.len());
                self.entries.push(TableEntry {
                    composition,
                    energy,
                });
            }
        }
        Ok(())
    }

    /// Build from `(formula, energy)` pairs, parsing each formula.
    pub fn from_formulas<'a, I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut table = Self::new();
        for (formula, energy) in rows {
            table.insert(Composition::parse(formula)?, energy)?;
        }
        Ok(table)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    pub fn get(&self, composition: &Composition) -> Option<&TableEntry> {
        self.index.get(composition).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TableEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a EnergyTable {
    type Item = &'a TableEntry;
    type IntoIter = std::slice::Iter<'a, TableEntry>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
