//! Half-space intersection in R^dim via polar duality.
//!
//! Algorithm
//! - Translate so the strictly interior point `p` is the origin. Each
//!   half-space becomes `a_i·x <= s_i` with slack `s_i = b_i - a_i·p > 0`.
//! - Reciprocate: dual points `y_i = a_i / s_i`. Duplicate constraints give the
//!   same dual point and collapse to one representative.
//! - Facets of `conv{y_i}` are the hyperplanes `n·y = 1` spanned by `dim`
//!   independent dual points with every dual point on the inner side. We find
//!   them by enumerating `dim`-subsets (same shape as a plain H→V enumeration,
//!   since `n·y_i = 1` is `a_i·n = s_i`).
//! - A facet normal `n` is a primal vertex in local coordinates, `p + n` in
//!   the original ones. The same `dim` rows with right-hand side `b_i` give
//!   that point directly, so vertices are solved in original coordinates and
//!   keep precision relative to their own size rather than to `|p|`.
//! - A candidate is kept only if it violates no half-space by more than
//!   `SOLVE_EPS · max(1, |b|, |a|·|x|)`. The tolerance never grows with the
//!   distance to the interior point, so compounds marginally above the hull
//!   cannot leak extra vertices.
//!
//! Complexity: `C(H, dim)` LU solves of size `dim`, each followed by an
//! `O(H·dim)` feasibility scan. Ternary and quaternary tables with a few
//! hundred phases are fine; a quinary table with 200 phases is already about
//! 3·10⁹ subsets, which this enumeration is not meant for.
//!
//! Preconditions
//! - The system is bounded. `halfspace::build_halfspaces` guarantees this for
//!   diagram input (box from below, elemental references from above). Here we
//!   only enforce the necessary conditions (full-rank normals, every axis
//!   blocked in both directions, at least `dim + 1` vertices).

use nalgebra::{DMatrix, DVector};

use crate::cfg::{DET_EPS, FEAS_EPS, SOLVE_EPS};
use crate::error::{CpdError, Result};
use crate::halfspace::{check_interior, HalfSpace};
use crate::util::{for_each_combination, lex_cmp, same_point};

/// Vertex of the intersection polytope with its tight constraints.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    pub coords: DVector<f64>,
    /// Indices of the half-spaces that are tight here (sorted).
    pub tight: Vec<usize>,
}

impl Vertex {
    /// True if any boundary half-space is tight here.
    pub fn touches_boundary(&self, hs: &[HalfSpace]) -> bool {
        self.tight.iter().any(|&i| hs[i].is_boundary())
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.coords.iter().copied().collect()
    }
}

/// Vertices of `{x : a_i·x <= b_i ∀i}` given a strictly interior point.
///
/// Output is sorted lexicographically by coordinates; each vertex satisfies
/// every half-space and has at least `dim` of them tight.
pub fn intersect(hs: &[HalfSpace], interior: &DVector<f64>) -> Result<Vec<Vertex>> {
    let dim = interior.len();
    if dim == 0 {
        return Err(degenerate(0, "zero-dimensional space".into()));
    }
    if let Some(bad) = hs.iter().position(|h| h.a.len() != dim) {
        return Err(degenerate(
            dim,
            format!("half-space {bad} has {} coefficients", hs[bad].a.len()),
        ));
    }
    check_interior(hs, interior)?;

    let slacks: Vec<f64> = hs.iter().map(|h| h.slack(interior)).collect();
    let duals: Vec<DVector<f64>> = hs
        .iter()
        .zip(&slacks)
        .map(|(h, &s)| &h.a / s)
        .collect();

    // Coincident constraints collapse onto one dual point.
    let mut reps: Vec<usize> = Vec::with_capacity(hs.len());
    for (i, y) in duals.iter().enumerate() {
        if !reps.iter().any(|&r| same_dual(&duals[r], y)) {
            reps.push(i);
        }
    }
    if reps.len() < dim + 1 {
        return Err(degenerate(
            dim,
            format!(
                "{} distinct constraints cannot bound a region (need at least {})",
                reps.len(),
                dim + 1
            ),
        ));
    }
    check_normals(hs, &reps, dim)?;

    let mut points: Vec<DVector<f64>> = Vec::new();
    let mut m = DMatrix::<f64>::zeros(dim, dim);
    let mut rhs = DVector::<f64>::zeros(dim);
    for_each_combination(reps.len(), dim, |comb| {
        let mut row_norms = 1.0;
        for (r, &k) in comb.iter().enumerate() {
            let h = &hs[reps[k]];
            m.set_row(r, &h.a.transpose());
            rhs[r] = h.b;
            row_norms *= h.a.norm();
        }
        let lu = m.clone().lu();
        // Hadamard bound: |det| <= Π|row|, so this ratio is scale-free.
        if row_norms == 0.0 || lu.determinant().abs() / row_norms < DET_EPS {
            return;
        }
        let Some(x) = lu.solve(&rhs) else {
            return;
        };
        if hs.iter().all(|h| within(h, &x)) {
            push_unique(&mut points, x);
        }
    });

    let mut out: Vec<Vertex> = points
        .into_iter()
        .map(|coords| {
            let tight = tight_set(hs, &coords);
            Vertex { coords, tight }
        })
        .collect();
    out.sort_by(|a, b| lex_cmp(&a.coords, &b.coords));

    tracing::debug!(
        dim,
        halfspaces = hs.len(),
        distinct = reps.len(),
        vertices = out.len(),
        "halfspace intersection"
    );

    if out.len() < dim + 1 {
        return Err(degenerate(
            dim,
            format!("only {} vertices; region is not full-dimensional", out.len()),
        ));
    }
    Ok(out)
}

/// Indices of half-spaces tight at `x`, relative to the magnitudes involved.
pub fn tight_set(hs: &[HalfSpace], x: &DVector<f64>) -> Vec<usize> {
    let xn = x.norm();
    hs.iter()
        .enumerate()
        .filter(|(_, h)| {
            let scale = h.b.abs().max(h.a.norm() * xn).max(1.0);
            (h.a.dot(x) - h.b).abs() <= FEAS_EPS * scale
        })
        .map(|(i, _)| i)
        .collect()
}

/// `a·x <= b` up to a tolerance relative to the magnitudes at `x`.
#[inline]
fn within(h: &HalfSpace, x: &DVector<f64>) -> bool {
    let scale = h.b.abs().max(h.a.norm() * x.norm()).max(1.0);
    h.a.dot(x) - h.b <= SOLVE_EPS * scale
}

/// Add `x` unless some stored point already coincides with it.
///
/// Checked against every stored point, not only the last one: near-equal
/// points need not be neighbours in any coordinate order.
fn push_unique(points: &mut Vec<DVector<f64>>, x: DVector<f64>) {
    if !points.iter().any(|q| same_point(q, &x, SOLVE_EPS)) {
        points.push(x);
    }
}

/// Dual points are tiny when slacks are large, so compare them relative to their size.
fn same_dual(a: &DVector<f64>, b: &DVector<f64>) -> bool {
    (a - b).norm() <= FEAS_EPS * a.norm().max(b.norm())
}

/// Full rank and every coordinate direction blocked both ways.
fn check_normals(hs: &[HalfSpace], reps: &[usize], dim: usize) -> Result<()> {
    let a = DMatrix::from_fn(reps.len(), dim, |r, c| hs[reps[r]].a[c]);
    let rank = a.rank(DET_EPS.sqrt());
    if rank < dim {
        return Err(degenerate(
            dim,
            format!("constraint normals span only {rank} dimensions"),
        ));
    }
    for axis in 0..dim {
        let up = reps.iter().any(|&i| hs[i].a[axis] > 0.0);
        let down = reps.iter().any(|&i| hs[i].a[axis] < 0.0);
        if !(up && down) {
            return Err(degenerate(
                dim,
                format!("region is unbounded along axis {axis}"),
            ));
        }
    }
    Ok(())
}

fn degenerate(dim: usize, reason: String) -> CpdError {
    CpdError::DegenerateGeometry { dim, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::halfspace::Constraint;

    fn hs(a: &[f64], b: f64, entry: usize) -> HalfSpace {
        HalfSpace::new(
            DVector::from_column_slice(a),
            b,
            Constraint::Stability { entry },
        )
    }

    fn cube(dim: usize) -> Vec<HalfSpace> {
        let mut out = Vec::new();
        for k in 0..dim {
            let mut a = vec![0.0; dim];
            a[k] = 1.0;
            out.push(hs(&a, 1.0, 2 * k));
            a[k] = -1.0;
            out.push(hs(&a, 1.0, 2 * k + 1));
        }
        out
    }

    #[test]
    fn square_has_four_vertices() {
        let v = intersect(&cube(2), &DVector::zeros(2)).unwrap();
        assert_eq!(v.len(), 4);
        assert_eq!(v[0].to_vec(), vec![-1.0, -1.0]);
        assert_eq!(v[3].to_vec(), vec![1.0, 1.0]);
        for x in &v {
            assert_eq!(x.tight.len(), 2);
        }
    }

    #[test]
    fn cube_4d_from_off_center_point() {
        let p = DVector::from_vec(vec![0.3, -0.2, 0.5, -0.9]);
        let v = intersect(&cube(4), &p).unwrap();
        assert_eq!(v.len(), 16);
        for x in &v {
            assert!(x.coords.iter().all(|c| (c.abs() - 1.0).abs() < 1e-12));
        }
    }

    #[test]
    fn duplicate_and_redundant_constraints_collapse() {
        let mut h = cube(3);
        h.push(h[0].clone());
        h.push(hs(&[2.0, 0.0, 0.0], 2.0, 99)); // same plane, scaled
        h.push(hs(&[1.0, 1.0, 1.0], 10.0, 100)); // redundant
        let v = intersect(&h, &DVector::zeros(3)).unwrap();
        assert_eq!(v.len(), 8);
    }

    #[test]
    fn degenerate_vertex_is_reported_once() {
        // square pyramid apex: four facets meet at one point in 3D
        let mut h = vec![
            hs(&[1.0, 0.0, 1.0], 1.0, 0),
            hs(&[-1.0, 0.0, 1.0], 1.0, 1),
            hs(&[0.0, 1.0, 1.0], 1.0, 2),
            hs(&[0.0, -1.0, 1.0], 1.0, 3),
        ];
        h.push(hs(&[0.0, 0.0, -1.0], 0.0, 4));
        let v = intersect(&h, &DVector::from_vec(vec![0.0, 0.0, 0.5])).unwrap();
        assert_eq!(v.len(), 5);
        let apex = v.iter().find(|x| x.coords[2] > 0.5).unwrap();
        assert_eq!(apex.tight, vec![0, 1, 2, 3]);
    }

    #[test]
    fn parallel_constraints_far_from_the_interior_stay_distinct() {
        // looser copy of x <= 0 listed first; both are ~1e5 away from p
        let h = vec![
            hs(&[1.0], 0.4, 0),
            hs(&[1.0], 0.0, 1),
            hs(&[-1.0], 1e5, 2),
        ];
        let v = intersect(&h, &DVector::from_vec(vec![-99999.0])).unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v[1].to_vec(), vec![0.0]);
        assert_eq!(v[1].tight, vec![1]);
    }

    #[test]
    fn compound_just_above_the_hull_adds_no_vertex() {
        // A, B, AB at -3.5 and A2B 5e-7 above the A-AB tie line (-7/3)
        let h = vec![
            hs(&[1.0, 0.0], 0.0, 0),
            hs(&[0.0, 1.0], 0.0, 1),
            hs(&[0.5, 0.5], -3.5, 2),
            hs(&[2.0 / 3.0, 1.0 / 3.0], -7.0 / 3.0 + 5e-7, 3),
            HalfSpace::new(
                DVector::from_vec(vec![-1.0, 0.0]),
                1e5,
                Constraint::Boundary { axis: 0 },
            ),
            HalfSpace::new(
                DVector::from_vec(vec![0.0, -1.0]),
                1e5,
                Constraint::Boundary { axis: 1 },
            ),
        ];
        let v = intersect(&h, &DVector::from_vec(vec![-99999.0, -99999.0])).unwrap();
        assert_eq!(v.len(), 5);
        for x in &v {
            assert!(h.iter().all(|c| c.satisfies_eps(&x.coords, 1e-10)));
            assert!(!x.tight.contains(&3));
        }
    }

    #[test]
    fn near_equal_points_merge_even_when_not_adjacent() {
        let mut pts = Vec::new();
        push_unique(&mut pts, DVector::from_vec(vec![0.0, 1.0]));
        // sorts between the other two by its first coordinate
        push_unique(&mut pts, DVector::from_vec(vec![5e-15, -100.0]));
        push_unique(&mut pts, DVector::from_vec(vec![1e-14, 1.0]));
        assert_eq!(pts.len(), 2);
    }

    #[test]
    fn infeasible_interior_point_is_an_error() {
        let err = intersect(&cube(2), &DVector::from_vec(vec![1.0, 0.0])).unwrap_err();
        assert!(matches!(err, CpdError::InfeasibleRegion { .. }));
    }

    #[test]
    fn unbounded_or_underdetermined_is_degenerate() {
        // only x <= 1 and y <= 1: open towards -inf
        let h = vec![hs(&[1.0, 0.0], 1.0, 0), hs(&[0.0, 1.0], 1.0, 1)];
        let err = intersect(&h, &DVector::zeros(2)).unwrap_err();
        assert!(matches!(err, CpdError::DegenerateGeometry { dim: 2, .. }));

        // strip: -1 <= x <= 1 with y unconstrained
        let h = vec![
            hs(&[1.0, 0.0], 1.0, 0),
            hs(&[-1.0, 0.0], 1.0, 1),
            hs(&[2.0, 0.0], 3.0, 2),
        ];
        let err = intersect(&h, &DVector::zeros(2)).unwrap_err();
        assert!(matches!(err, CpdError::DegenerateGeometry { dim: 2, .. }));

        let err = intersect(&[], &DVector::zeros(0)).unwrap_err();
        assert!(matches!(err, CpdError::DegenerateGeometry { dim: 0, .. }));
    }

    #[test]
    fn triangle_vertices_satisfy_every_constraint() {
        let h = vec![
            hs(&[-1.0, 0.0], 0.0, 0),
            hs(&[0.0, -1.0], 0.0, 1),
            hs(&[1.0, 1.0], 1.0, 2),
        ];
        let p = DVector::from_vec(vec![0.25, 0.25]);
        let v = intersect(&h, &p).unwrap();
        assert_eq!(v.len(), 3);
        for x in &v {
            assert!(h.iter().all(|c| c.satisfies_eps(&x.coords, 1e-12)));
            assert!(x.tight.len() >= 2);
        }
    }
}
