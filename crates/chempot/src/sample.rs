//! Random energy tables (seeded, replayable).
//!
//! Purpose
//! - Feed property tests and benchmarks with well-posed tables of controllable
//!   size. Every element gets at least one elemental entry, so reference
//!   resolution always succeeds.
//!
//! Model
//! - Elemental entries: one ground state plus optional higher polymorphs.
//! - Compounds: random subsets of 2..=max_species elements with counts in
//!   1..=max_count; energy per atom = reference mix + formation term drawn
//!   from `formation_range`.
//! - Determinism uses a replay token `(seed, index)` mixed into one RNG.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::composition::Composition;
use crate::error::Result;
use crate::table::EnergyTable;

const SYMBOLS: [&str; 8] = ["Al", "Ca", "Fe", "Li", "Mg", "N", "O", "Si"];

#[derive(Clone, Copy, Debug)]
pub struct TableCfg {
    /// Number of elements, clamped to 1..=8.
    pub elements: usize,
    pub compounds: usize,
    /// Largest number of distinct elements in one compound.
    pub max_species: usize,
    pub max_count: u32,
    /// Per-atom formation energy range relative to the references.
    pub formation_range: (f64, f64),
    /// Extra elemental polymorphs per element (above the ground state).
    pub polymorphs: usize,
}

impl Default for TableCfg {
    fn default() -> Self {
        Self {
            elements: 3,
            compounds: 8,
            max_species: 3,
            max_count: 4,
            formation_range: (-2.0, 0.5),
            polymorphs: 1,
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64-style mixing, cheap and stable.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Draw a random, well-posed energy table.
///
/// Draws are finite and non-empty, so an error here means a broken invariant
/// in the generator rather than bad input.
pub fn draw_table(cfg: TableCfg, tok: ReplayToken) -> Result<EnergyTable> {
    let mut rng = tok.to_std_rng();
    let n_el = cfg.elements.clamp(1, SYMBOLS.len());
    let elements = &SYMBOLS[..n_el];
    let refs: Vec<f64> = (0..n_el).map(|_| rng.gen_range(-9.0..-1.0)).collect();
    let (lo, hi) = if cfg.formation_range.0 <= cfg.formation_range.1 {
        cfg.formation_range
    } else {
        (cfg.formation_range.1, cfg.formation_range.0)
    };

    let mut table = EnergyTable::new();
    for (el, &mu) in elements.iter().zip(&refs) {
        table.insert(Composition::element(el), mu)?;
        for k in 0..cfg.polymorphs {
            let atoms = k as u32 + 2;
            let above = rng.gen_range(0.01..0.5);
            table.insert(
                Composition::from_pairs([(*el, atoms)]),
                f64::from(atoms) * (mu + above),
            )?;
        }
    }

    let max_species = cfg.max_species.clamp(2, n_el.max(2));
    for _ in 0..cfg.compounds {
        if n_el < 2 {
            break;
        }
        let k = rng.gen_range(2..=max_species.min(n_el));
        let picked: Vec<usize> = {
            let mut idx: Vec<usize> = (0..n_el).collect();
            idx.shuffle(&mut rng);
            idx.truncate(k);
            idx
        };
        let pairs: Vec<(&str, u32)> = picked
            .iter()
            .map(|&i| (elements[i], rng.gen_range(1..=cfg.max_count.max(1))))
            .collect();
        let comp = Composition::from_pairs(pairs);
        let atoms = f64::from(comp.num_atoms());
        let mix: f64 = picked
            .iter()
            .map(|&i| comp.fractional(elements[i]) * refs[i])
            .sum();
        let formation = if hi > lo { rng.gen_range(lo..hi) } else { lo };
        // duplicates of an earlier composition simply replace its energy
        table.insert(comp, atoms * (mix + formation))?;
    }
    Ok(table)
}
