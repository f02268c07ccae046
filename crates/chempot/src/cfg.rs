//! Tolerances and knobs for diagram construction.
//!
//! Policy
//! - Defaults are fixed constants; `CpdCfg` only exists so callers that need a
//!   different bounding box or the legacy sentinel test can opt in without
//!   touching call sites broadly.

/// Relative distance under which two dual points (constraints) coincide.
pub(crate) const FEAS_EPS: f64 = 1e-9;
/// Relative slack for candidate feasibility and vertex dedup in the solver.
///
/// Kept well below `ON_PLANE_EPS` so a vertex accepted here never puts an
/// off-hull compound on its plane.
pub(crate) const SOLVE_EPS: f64 = 1e-11;
/// Pivot threshold below which a `dim`-subset of constraints is treated as singular.
pub(crate) const DET_EPS: f64 = 1e-12;
/// Absolute distance for a vertex to count as lying on a compound's plane.
pub const ON_PLANE_EPS: f64 = 1e-8;
/// Decimal places kept in facet coordinates handed to plotting.
pub const ROUND_DIGITS: i32 = 5;
/// Lower edge of the artificial bounding box on every chemical potential.
pub const DEFAULT_MIN_RANGE: f64 = -1e5;

/// How box-touching vertices are told apart from physical ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundaryTest {
    /// A vertex is artificial iff one of the boundary half-spaces is tight at it.
    #[default]
    Provenance,
    /// A vertex is artificial iff `min(coords) == min_range` with exact float equality.
    ExactSentinel,
}

/// Diagram configuration.
#[derive(Clone, Copy, Debug)]
pub struct CpdCfg {
    pub min_range: f64,
    pub on_plane_eps: f64,
    pub round_digits: i32,
    pub boundary_test: BoundaryTest,
}

impl Default for CpdCfg {
    fn default() -> Self {
        Self {
            min_range: DEFAULT_MIN_RANGE,
            on_plane_eps: ON_PLANE_EPS,
            round_digits: ROUND_DIGITS,
            boundary_test: BoundaryTest::default(),
        }
    }
}

impl CpdCfg {
    #[inline]
    pub fn with_min_range(mut self, min_range: f64) -> Self {
        self.min_range = min_range;
        self
    }
    #[inline]
    pub fn with_boundary_test(mut self, boundary_test: BoundaryTest) -> Self {
        self.boundary_test = boundary_test;
        self
    }
}

/// Round to `digits` decimal places (half away from zero).
///
/// Idempotent: rounding an already rounded value returns it unchanged.
#[inline]
pub fn round_to(x: f64, digits: i32) -> f64 {
    let s = 10f64.powi(digits);
    let r = (x * s).round() / s;
    // normalize -0.0 so rounded facets compare and print cleanly
    if r == 0.0 {
        0.0
    } else {
        r
    }
}
