//! Serializable view of a diagram run.

use std::collections::BTreeMap;

use chempot::{ChemPotDiag, CpdPlotInfo};
use serde::Serialize;

#[derive(Serialize)]
pub struct CompoundRow {
    pub formula: String,
    pub reduced_formula: String,
    pub energy: f64,
    pub abs_energy: f64,
    pub rel_energy: f64,
}

#[derive(Serialize)]
pub struct LabelledVertex {
    pub label: String,
    pub coords: Vec<f64>,
}

#[derive(Serialize)]
pub struct DiagramReport {
    pub vertex_elements: Vec<String>,
    pub offsets: Vec<f64>,
    pub min_range: f64,
    pub compounds: Vec<CompoundRow>,
    pub vertex_coords: Vec<Vec<f64>>,
    pub comp_vertices: BTreeMap<String, Vec<Vec<f64>>>,
    pub unstable: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_vertices: Vec<LabelledVertex>,
}

impl DiagramReport {
    pub fn new(cpd: &ChemPotDiag, info: &CpdPlotInfo) -> Self {
        let compounds = cpd
            .table()
            .iter()
            .zip(cpd.rel_energies())
            .map(|(e, &rel)| CompoundRow {
                formula: e.composition.formula(),
                reduced_formula: e.composition.reduced_formula(),
                energy: e.energy,
                abs_energy: e.abs_energy(),
                rel_energy: rel,
            })
            .collect();
        Self {
            vertex_elements: cpd.vertex_elements().to_vec(),
            offsets: cpd.offset_to_abs(),
            min_range: cpd.cfg().min_range,
            compounds,
            vertex_coords: cpd.vertex_coords().to_vec(),
            comp_vertices: info.comp_vertices().clone(),
            unstable: info.unstable_compounds().to_vec(),
            target: info.target().map(str::to_string),
            target_vertices: info
                .target_vertices()
                .into_iter()
                .map(|(label, coords)| LabelledVertex { label, coords })
                .collect(),
        }
    }
}
