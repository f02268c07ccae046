//! Half-space system in chemical-potential space.
//!
//! Conventions
//! - Half-spaces use `a·μ <= b`; `a` is not normalized.
//! - Stability constraints come first (table order), then one boundary per axis.
//! - Every half-space carries its provenance, so box artifacts can be recognised
//!   without comparing coordinates against the `min_range` sentinel.

use nalgebra::DVector;

use crate::error::{CpdError, Result};

/// Where a half-space comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constraint {
    /// `Σ frac_i·μ_i <= rel_energy` for table entry `entry`.
    Stability { entry: usize },
    /// `-μ_axis <= -min_range`, closing the box from below.
    Boundary { axis: usize },
}

/// Closed half-space `a · μ <= b` in R^dim.
#[derive(Clone, Debug, PartialEq)]
pub struct HalfSpace {
    pub a: DVector<f64>,
    pub b: f64,
    pub constraint: Constraint,
}

impl HalfSpace {
    #[inline]
    pub fn new(a: DVector<f64>, b: f64, constraint: Constraint) -> Self {
        Self { a, b, constraint }
    }

    /// `b - a·p`; positive strictly inside.
    #[inline]
    pub fn slack(&self, p: &DVector<f64>) -> f64 {
        self.b - self.a.dot(p)
    }

    #[inline]
    pub fn satisfies_eps(&self, p: &DVector<f64>, eps: f64) -> bool {
        self.a.dot(p) <= self.b + eps
    }

    #[inline]
    pub fn is_boundary(&self) -> bool {
        matches!(self.constraint, Constraint::Boundary { .. })
    }
}

/// Build `N + dim` half-spaces from per-entry fractions and relative energies.
///
/// `fractions[k]` is entry `k`'s fraction vector over the vertex elements.
pub fn build_halfspaces(
    fractions: &[Vec<f64>],
    rel_energies: &[f64],
    min_range: f64,
) -> Vec<HalfSpace> {
    let dim = fractions.first().map_or(0, Vec::len);
    let mut out = Vec::with_capacity(fractions.len() + dim);
    for (entry, (frac, &e)) in fractions.iter().zip(rel_energies).enumerate() {
        out.push(HalfSpace::new(
            DVector::from_column_slice(frac),
            e,
            Constraint::Stability { entry },
        ));
    }
    for axis in 0..dim {
        let mut a = DVector::zeros(dim);
        a[axis] = -1.0;
        out.push(HalfSpace::new(a, -min_range, Constraint::Boundary { axis }));
    }
    out
}

/// `min_range + 1` on every axis.
pub fn interior_point(dim: usize, min_range: f64) -> DVector<f64> {
    DVector::from_element(dim, min_range + 1.0)
}

/// Require `p` strictly inside every half-space.
pub fn check_interior(hs: &[HalfSpace], p: &DVector<f64>) -> Result<()> {
    if !p.iter().all(|x| x.is_finite()) {
        return Err(CpdError::InfeasibleRegion {
            reason: format!("interior point {:?} is not finite", p.as_slice()),
        });
    }
    for (i, h) in hs.iter().enumerate() {
        let s = h.slack(p);
        if s.is_nan() || s <= 0.0 {
            return Err(CpdError::InfeasibleRegion {
                reason: format!(
                    "half-space {i} ({:?}) has slack {s} at {:?}",
                    h.constraint,
                    p.as_slice()
                ),
            });
        }
    }
    Ok(())
}
