//! Chemical-potential diagram: the full pipeline from energy table to vertices.
//!
//! `ChemPotDiag::new` runs every stage eagerly (elements, references, relative
//! energies, polytope) and keeps the results immutable. Errors surface from the
//! stage that detects them: missing references before any half-space exists,
//! infeasible interior points and degenerate geometry from the solver.

use nalgebra::DVector;

use crate::cfg::{BoundaryTest, CpdCfg};
use crate::composition::Composition;
use crate::error::{CpdError, Result};
use crate::halfspace::{build_halfspaces, interior_point, HalfSpace};
use crate::hull::{intersect, Vertex};
use crate::reference::{offset_energies, vertex_elements, ReferenceState};
use crate::relative::{frac_composition, relative_energies};
use crate::table::EnergyTable;

/// Half-spaces for one bounding box and the polytope they cut out.
#[derive(Clone, Debug)]
pub struct Intersection {
    pub min_range: f64,
    pub halfspaces: Vec<HalfSpace>,
    pub interior: DVector<f64>,
    pub vertices: Vec<Vertex>,
}

impl Intersection {
    /// Vertices that are not artifacts of the bounding box.
    pub fn true_vertices(&self, test: BoundaryTest) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices.iter().filter(move |v| match test {
            BoundaryTest::Provenance => !v.touches_boundary(&self.halfspaces),
            BoundaryTest::ExactSentinel => {
                v.coords.iter().copied().fold(f64::INFINITY, f64::min) != self.min_range
            }
        })
    }
}

#[derive(Clone, Debug)]
pub struct ChemPotDiag {
    table: EnergyTable,
    cfg: CpdCfg,
    vertex_elements: Vec<String>,
    references: Vec<ReferenceState>,
    fractions: Vec<Vec<f64>>,
    rel_energies: Vec<f64>,
    intersection: Intersection,
    vertex_coords: Vec<Vec<f64>>,
}

impl ChemPotDiag {
    pub fn new(table: EnergyTable) -> Result<Self> {
        Self::with_cfg(table, CpdCfg::default())
    }

    pub fn with_cfg(table: EnergyTable, cfg: CpdCfg) -> Result<Self> {
        if table.is_empty() {
            return Err(CpdError::EmptyTable);
        }
        let vertex_elements = vertex_elements(&table);
        let references = offset_energies(&table, &vertex_elements)?;
        let fractions: Vec<Vec<f64>> = table
            .iter()
            .map(|e| frac_composition(&e.composition, &vertex_elements))
            .collect();
        let rel_energies = relative_energies(&table, &vertex_elements, &references);
        let intersection = solve(&fractions, &rel_energies, cfg.min_range)?;
        let vertex_coords = intersection
            .true_vertices(cfg.boundary_test)
            .map(Vertex::to_vec)
            .collect();
        tracing::debug!(
            dim = vertex_elements.len(),
            compounds = table.len(),
            vertices = intersection.vertices.len(),
            "chemical potential diagram built"
        );
        Ok(Self {
            table,
            cfg,
            vertex_elements,
            references,
            fractions,
            rel_energies,
            intersection,
            vertex_coords,
        })
    }

    #[inline]
    pub fn table(&self) -> &EnergyTable {
        &self.table
    }
    #[inline]
    pub fn cfg(&self) -> &CpdCfg {
        &self.cfg
    }
    #[inline]
    pub fn vertex_elements(&self) -> &[String] {
        &self.vertex_elements
    }
    #[inline]
    pub fn dim(&self) -> usize {
        self.vertex_elements.len()
    }
    #[inline]
    pub fn references(&self) -> &[ReferenceState] {
        &self.references
    }

    /// Offset (reference per-atom) energy per vertex element, in axis order.
    pub fn offset_to_abs(&self) -> Vec<f64> {
        self.references.iter().map(|r| r.energy).collect()
    }

    /// Per-atom energy of each entry, in table order.
    pub fn abs_energies(&self) -> Vec<f64> {
        self.table.iter().map(|e| e.abs_energy()).collect()
    }

    /// Relative energy of each entry, in table order.
    #[inline]
    pub fn rel_energies(&self) -> &[f64] {
        &self.rel_energies
    }

    /// Relative energy of one composition, if it is in the table.
    pub fn rel_energy(&self, c: &Composition) -> Option<f64> {
        let i = self.table.iter().position(|e| &e.composition == c)?;
        Some(self.rel_energies[i])
    }

    /// Fraction vector of entry `entry` over the vertex elements.
    #[inline]
    pub fn fractions(&self, entry: usize) -> &[f64] {
        &self.fractions[entry]
    }

    /// Fraction vector of any composition over the vertex elements.
    pub fn frac_composition(&self, c: &Composition) -> Vec<f64> {
        frac_composition(c, &self.vertex_elements)
    }

    /// Polytope for the configured `min_range`.
    #[inline]
    pub fn intersection(&self) -> &Intersection {
        &self.intersection
    }

    /// Rebuild the polytope with another bounding box.
    pub fn half_space_intersection(&self, min_range: f64) -> Result<Intersection> {
        if min_range == self.intersection.min_range {
            return Ok(self.intersection.clone());
        }
        solve(&self.fractions, &self.rel_energies, min_range)
    }

    /// Coordinates of the physical (non-box) vertices.
    #[inline]
    pub fn vertex_coords(&self) -> &[Vec<f64>] {
        &self.vertex_coords
    }

    /// `(min, max)` of each chemical potential over the physical vertices.
    ///
    /// `None` when every vertex touches the box.
    pub fn element_ranges(&self) -> Option<Vec<(f64, f64)>> {
        if self.vertex_coords.is_empty() {
            return None;
        }
        let mut out = vec![(f64::INFINITY, f64::NEG_INFINITY); self.dim()];
        for v in &self.vertex_coords {
            for (range, &x) in out.iter_mut().zip(v) {
                range.0 = range.0.min(x);
                range.1 = range.1.max(x);
            }
        }
        Some(out)
    }
}

fn solve(fractions: &[Vec<f64>], rel_energies: &[f64], min_range: f64) -> Result<Intersection> {
    let dim = fractions.first().map_or(0, Vec::len);
    let halfspaces = build_halfspaces(fractions, rel_energies, min_range);
    let interior = interior_point(dim, min_range);
    let vertices = intersect(&halfspaces, &interior)?;
    Ok(Intersection {
        min_range,
        halfspaces,
        interior,
        vertices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::halfspace::Constraint;

    fn binary(ab: f64) -> EnergyTable {
        EnergyTable::from_formulas([("A", -2.0), ("B", -3.0), ("AB", ab)]).unwrap()
    }

    fn approx(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn binary_diagram() {
        // AB at -6.0 per atom (-12.0 per formula unit): rel = -6.0 - (0.5·-2.0 + 0.5·-3.0) = -3.5
        let cfg = CpdCfg::default().with_min_range(-100.0);
        let d = ChemPotDiag::with_cfg(binary(-12.0), cfg).unwrap();
        assert_eq!(d.dim(), 2);
        assert_eq!(d.vertex_elements(), &["A".to_string(), "B".to_string()]);
        assert_eq!(d.offset_to_abs(), vec![-2.0, -3.0]);
        assert!((d.rel_energies()[2] + 3.5).abs() < 1e-12);
        assert_eq!(d.intersection().halfspaces.len(), 3 + 2);

        // pentagon: one box corner, two points on box edges, two physical points
        assert_eq!(d.intersection().vertices.len(), 5);
        let coords = d.vertex_coords();
        assert_eq!(coords.len(), 2);
        assert!(approx(&coords[0], &[-7.0, 0.0]));
        assert!(approx(&coords[1], &[0.0, -7.0]));
        for v in coords {
            assert!(0.5 * v[0] + 0.5 * v[1] <= -3.5 + 1e-9);
            assert!(v.iter().all(|&x| x != -100.0));
        }
        for (lo, hi) in d.element_ranges().unwrap() {
            assert!((lo + 7.0).abs() < 1e-9 && hi.abs() < 1e-9);
        }
    }

    #[test]
    fn per_formula_unit_energy_is_divided_by_atoms() {
        let d = ChemPotDiag::new(binary(-6.0)).unwrap();
        assert!((d.rel_energies()[2] + 0.5).abs() < 1e-12);
        assert_eq!(d.abs_energies(), vec![-2.0, -3.0, -3.0]);
        let ab = Composition::parse("AB").unwrap();
        assert!((d.rel_energy(&ab).unwrap() + 0.5).abs() < 1e-12);
        assert_eq!(d.frac_composition(&ab), vec![0.5, 0.5]);
    }

    #[test]
    fn missing_reference_before_any_halfspace() {
        let t = EnergyTable::from_formulas([("A", -2.0), ("AB", -6.0)]).unwrap();
        let err = ChemPotDiag::new(t).unwrap_err();
        assert_eq!(
            err,
            CpdError::MissingReference {
                element: "B".into()
            }
        );
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = ChemPotDiag::new(EnergyTable::new()).unwrap_err();
        assert_eq!(err, CpdError::EmptyTable);
    }

    #[test]
    fn small_box_is_infeasible() {
        let cfg = CpdCfg::default().with_min_range(-3.0);
        let err = ChemPotDiag::with_cfg(binary(-12.0), cfg).unwrap_err();
        assert!(matches!(err, CpdError::InfeasibleRegion { .. }));
    }

    #[test]
    fn unary_system() {
        let t = EnergyTable::from_formulas([("Si", -5.4), ("Si2", -10.0)]).unwrap();
        let d = ChemPotDiag::new(t).unwrap();
        assert_eq!(d.dim(), 1);
        // only the box edge and μ_Si = 0
        assert_eq!(d.vertex_coords(), &[vec![0.0]]);
    }

    #[test]
    fn ternary_true_vertices_are_feasible_and_off_box() {
        let t = EnergyTable::from_formulas([
            ("Mg", -1.5),
            ("O2", -9.8),
            ("Al", -3.7),
            ("MgO", -12.0),
            ("Al2O3", -37.5),
            ("MgAl2O4", -50.6),
            ("MgO2", -14.0),
        ])
        .unwrap();
        let d = ChemPotDiag::new(t).unwrap();
        assert_eq!(d.dim(), 3);
        assert_eq!(d.intersection().halfspaces.len(), 7 + 3);
        assert!(!d.vertex_coords().is_empty());
        for v in d.vertex_coords() {
            let x = DVector::from_column_slice(v);
            for h in &d.intersection().halfspaces {
                if let Constraint::Stability { .. } = h.constraint {
                    assert!(h.satisfies_eps(&x, 1e-8));
                }
            }
            assert!(v.iter().all(|&c| c != d.cfg().min_range));
        }
    }

    #[test]
    fn sentinel_and_provenance_filters_agree_on_clean_input() {
        let t = binary(-12.0);
        let a = ChemPotDiag::new(t.clone()).unwrap();
        let b = ChemPotDiag::with_cfg(
            t,
            CpdCfg::default().with_boundary_test(BoundaryTest::ExactSentinel),
        )
        .unwrap();
        assert_eq!(a.vertex_coords(), b.vertex_coords());
    }

    #[test]
    fn half_space_intersection_reuses_or_rebuilds() {
        let d = ChemPotDiag::new(binary(-12.0)).unwrap();
        let same = d.half_space_intersection(d.cfg().min_range).unwrap();
        assert_eq!(same.vertices, d.intersection().vertices);
        let small = d.half_space_intersection(-50.0).unwrap();
        assert_eq!(small.min_range, -50.0);
        assert!(small
            .vertices
            .iter()
            .any(|v| v.coords.iter().any(|&c| c == -50.0)));
    }
}
