//! Chemical-potential diagrams from formation-energy tables.
//!
//! Pipeline
//! - `table`: compositions with absolute energies per formula unit.
//! - `reference`: vertex elements (axes) and elemental reference energies.
//! - `relative`: energies relative to the references.
//! - `halfspace`: one stability half-space per compound plus a bounding box.
//! - `hull`: vertices of the half-space intersection (polar duality).
//! - `diagram` / `plot_info`: physical vertices and per-compound facets.
//!
//! The crate is pure: no I/O, no shared state. Independent diagrams can be
//! built on separate threads without coordination.

pub mod cfg;
pub mod composition;
pub mod diagram;
pub mod error;
pub mod halfspace;
pub mod hull;
pub mod plot_info;
pub mod reference;
pub mod relative;
pub mod sample;
pub mod table;
mod util;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::{BoundaryTest, CpdCfg, DEFAULT_MIN_RANGE};
pub use composition::Composition;
pub use diagram::{ChemPotDiag, Intersection};
pub use error::{CpdError, FormulaError, Result};
pub use plot_info::{CompVertices, CpdPlotInfo};
pub use table::{EnergyTable, TableEntry};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::{
        round_to, BoundaryTest, CpdCfg, DEFAULT_MIN_RANGE, ON_PLANE_EPS, ROUND_DIGITS,
    };
    pub use crate::composition::Composition;
    pub use crate::diagram::{ChemPotDiag, Intersection};
    pub use crate::error::{CpdError, FormulaError};
    pub use crate::halfspace::{Constraint, HalfSpace};
    pub use crate::hull::{intersect, Vertex};
    pub use crate::plot_info::{on_plane, vertex_label, CompVertices, CpdPlotInfo};
    pub use crate::reference::ReferenceState;
    pub use crate::sample::{draw_table, ReplayToken, TableCfg};
    pub use crate::table::{EnergyTable, TableEntry};
}
