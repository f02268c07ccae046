//! Per-compound facets of a diagram, ready for plotting.
//!
//! Every solver vertex (box-touching ones included, a facet may run along the
//! box) is tested against each compound's plane `Σ frac_i·μ_i = rel_energy`.
//! Matches are rounded and grouped by reduced formula.

use std::collections::BTreeMap;

use crate::cfg::round_to;
use crate::composition::Composition;
use crate::diagram::ChemPotDiag;
use crate::error::{CpdError, Result};

/// Reduced formula -> rounded vertices on that compound's plane.
pub type CompVertices = BTreeMap<String, Vec<Vec<f64>>>;

#[derive(Clone, Debug)]
pub struct CpdPlotInfo {
    comp_vertices: CompVertices,
    unstable: Vec<String>,
    target: Option<String>,
}

impl CpdPlotInfo {
    /// Group the vertices of `cpd` (recomputed for `min_range` if given).
    ///
    /// With a target, fails with `TargetNotFound` unless the target has a facet.
    pub fn new(
        cpd: &ChemPotDiag,
        target: Option<&Composition>,
        min_range: Option<f64>,
    ) -> Result<Self> {
        let comp_vertices = comp_vertices(cpd, min_range)?;
        let mut unstable: Vec<String> = Vec::new();
        for entry in cpd.table() {
            let f = entry.composition.reduced_formula();
            if !comp_vertices.contains_key(&f) && !unstable.contains(&f) {
                unstable.push(f);
            }
        }
        let target = match target {
            Some(c) => {
                let f = c.reduced_formula();
                if !comp_vertices.contains_key(&f) {
                    return Err(CpdError::TargetNotFound { formula: f });
                }
                Some(f)
            }
            None => None,
        };
        Ok(Self {
            comp_vertices,
            unstable,
            target,
        })
    }

    #[inline]
    pub fn comp_vertices(&self) -> &CompVertices {
        &self.comp_vertices
    }

    #[inline]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Facet of an arbitrary compound.
    pub fn facet(&self, c: &Composition) -> Result<&[Vec<f64>]> {
        let f = c.reduced_formula();
        self.comp_vertices
            .get(&f)
            .map(Vec::as_slice)
            .ok_or(CpdError::TargetNotFound { formula: f })
    }

    /// The target facet labelled `A, B, …` in vertex order; empty without a target.
    pub fn target_vertices(&self) -> Vec<(String, Vec<f64>)> {
        let Some(target) = &self.target else {
            return Vec::new();
        };
        self.comp_vertices
            .get(target)
            .map(|vs| {
                vs.iter()
                    .enumerate()
                    .map(|(i, v)| (vertex_label(i), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reduced formulas that own a facet.
    pub fn stable_compounds(&self) -> impl Iterator<Item = &str> + '_ {
        self.comp_vertices.keys().map(String::as_str)
    }

    /// Reduced formulas in the table without a facet, in table order.
    #[inline]
    pub fn unstable_compounds(&self) -> &[String] {
        &self.unstable
    }
}

/// Group solver vertices by the compound plane they lie on.
pub fn comp_vertices(cpd: &ChemPotDiag, min_range: Option<f64>) -> Result<CompVertices> {
    let cfg = cpd.cfg();
    let hs = cpd.half_space_intersection(min_range.unwrap_or(cfg.min_range))?;
    let mut out = CompVertices::new();
    for (k, entry) in cpd.table().iter().enumerate() {
        let frac = cpd.fractions(k);
        let e = cpd.rel_energies()[k];
        let coords: Vec<Vec<f64>> = hs
            .vertices
            .iter()
            .filter(|v| on_plane(frac, v.coords.as_slice(), e, cfg.on_plane_eps))
            .map(|v| v.coords.iter().map(|&x| round_to(x, cfg.round_digits)).collect())
            .collect();
        if !coords.is_empty() {
            out.insert(entry.composition.reduced_formula(), coords);
        }
    }
    Ok(out)
}

/// `|frac·coord - energy| < eps`.
#[inline]
pub fn on_plane(frac: &[f64], coord: &[f64], energy: f64, eps: f64) -> bool {
    let dot: f64 = frac.iter().zip(coord).map(|(f, x)| f * x).sum();
    (dot - energy).abs() < eps
}

/// Spreadsheet-style labels: A..Z, AA, AB, …
pub fn vertex_label(mut i: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (i % 26) as u8);
        if i < 26 {
            break;
        }
        i = i / 26 - 1;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
