//! Provenance sidecar for `cpd diagram` outputs.
//!
//! `<out>.provenance.json` records which build produced the diagram, the
//! parameters it ran with, and a summary of what came out (axes, vertex and
//! facet counts), so a result file can be checked without re-reading it.

use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chempot::{ChemPotDiag, CpdPlotInfo};
use serde::Serialize;

/// Commit baked in at build time, if the build set `GIT_COMMIT`.
pub fn code_rev() -> &'static str {
    option_env!("GIT_COMMIT").unwrap_or("unknown")
}

#[derive(Serialize)]
pub struct Params {
    pub input: String,
    pub min_range: f64,
    pub target: Option<String>,
    pub boundary_test: String,
}

/// What the run produced.
#[derive(Serialize, Debug, PartialEq)]
pub struct RunSummary {
    pub vertex_elements: Vec<String>,
    pub dim: usize,
    pub compounds: usize,
    pub solver_vertices: usize,
    pub true_vertices: usize,
    pub stable: usize,
    pub unstable: usize,
}

impl RunSummary {
    pub fn new(cpd: &ChemPotDiag, info: &CpdPlotInfo) -> Self {
        Self {
            vertex_elements: cpd.vertex_elements().to_vec(),
            dim: cpd.dim(),
            compounds: cpd.table().len(),
            solver_vertices: cpd.intersection().vertices.len(),
            true_vertices: cpd.vertex_coords().len(),
            stable: info.comp_vertices().len(),
            unstable: info.unstable_compounds().len(),
        }
    }
}

#[derive(Serialize)]
struct Callsite {
    file: &'static str,
    line: u32,
}

#[derive(Serialize)]
struct Sidecar<'a> {
    code_rev: &'static str,
    chempot_version: &'static str,
    callsite: Callsite,
    tag: Option<&'a str>,
    params: &'a Params,
    run: &'a RunSummary,
    outputs: [String; 1],
}

/// `cpd.json` -> `cpd.provenance.json`.
pub fn sidecar_path(artifact: &Path) -> PathBuf {
    artifact.with_extension("provenance.json")
}

/// Write the sidecar next to `artifact` and return its path.
#[track_caller]
pub fn write_sidecar(
    artifact: &Path,
    tag: Option<&str>,
    params: &Params,
    run: &RunSummary,
) -> Result<PathBuf> {
    let caller = Location::caller();
    let doc = Sidecar {
        code_rev: code_rev(),
        chempot_version: chempot::VERSION,
        callsite: Callsite {
            file: caller.file(),
            line: caller.line(),
        },
        tag,
        params,
        run,
        outputs: [artifact.to_string_lossy().into_owned()],
    };
    let path = sidecar_path(artifact);
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(path = %path.display(), "provenance written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chempot::{CpdCfg, EnergyTable};
    use serde_json::Value;
    use tempfile::tempdir;

    fn binary() -> (ChemPotDiag, CpdPlotInfo) {
        let t =
            EnergyTable::from_formulas([("A", -2.0), ("B", -3.0), ("AB", -12.0), ("A2B", -10.0)])
                .unwrap();
        let d = ChemPotDiag::with_cfg(t, CpdCfg::default().with_min_range(-100.0)).unwrap();
        let info = CpdPlotInfo::new(&d, None, None).unwrap();
        (d, info)
    }

    #[test]
    fn sidecar_path_replaces_extension() {
        assert_eq!(
            sidecar_path(Path::new("/tmp/output/cpd.json")),
            Path::new("/tmp/output/cpd.provenance.json")
        );
    }

    #[test]
    fn summary_counts_the_run() {
        let (d, info) = binary();
        let run = RunSummary::new(&d, &info);
        assert_eq!(
            run,
            RunSummary {
                vertex_elements: vec!["A".into(), "B".into()],
                dim: 2,
                compounds: 4,
                solver_vertices: 5,
                true_vertices: 2,
                stable: 3,
                unstable: 1,
            }
        );
    }

    #[test]
    fn sidecar_records_params_run_and_tag() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("cpd.json");
        let (d, info) = binary();
        let params = Params {
            input: "table.json".into(),
            min_range: -100.0,
            target: None,
            boundary_test: "Provenance".into(),
        };
        let run = RunSummary::new(&d, &info);
        let path = write_sidecar(&artifact, Some("mgo-run"), &params, &run).unwrap();
        let parsed: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
        assert_eq!(parsed["tag"], "mgo-run");
        assert_eq!(parsed["params"]["min_range"], -100.0);
        assert_eq!(parsed["run"]["vertex_elements"][1], "B");
        assert_eq!(parsed["run"]["unstable"], 1);
        assert_eq!(parsed["chempot_version"], chempot::VERSION);
        assert!(parsed["callsite"]["line"].as_u64().unwrap() > 0);
    }
}
