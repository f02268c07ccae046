use anyhow::{Context, Result};
use chempot::{BoundaryTest, ChemPotDiag, Composition, CpdCfg, CpdPlotInfo};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod input;
mod provenance;
mod report;

use provenance::{write_sidecar, Params, RunSummary};
use report::DiagramReport;

#[derive(Parser)]
#[command(name = "cpd")]
#[command(about = "Chemical-potential diagrams from energy tables")]
struct Cmd {
    /// Optional free-form tag; propagated to outputs and logs
    #[arg(long)]
    tag: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Build a diagram from a JSON or CSV energy table and write it as JSON
    Diagram {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Lower edge of the bounding box on every chemical potential
        #[arg(long, allow_hyphen_values = true)]
        min_range: Option<f64>,
        /// Compound whose facet is labelled for plotting
        #[arg(long)]
        target: Option<String>,
        /// Drop box vertices by exact comparison against min_range
        #[arg(long)]
        exact_sentinel: bool,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Diagram {
            input,
            out,
            min_range,
            target,
            exact_sentinel,
        } => diagram(
            &input,
            &out,
            min_range,
            target.as_deref(),
            exact_sentinel,
            cmd.tag,
        ),
        Action::Report => report(cmd.tag),
    }
}

fn diagram(
    input: &Path,
    out: &Path,
    min_range: Option<f64>,
    target: Option<&str>,
    exact_sentinel: bool,
    tag: Option<String>,
) -> Result<()> {
    tracing::info!(
        input = %input.display(),
        out = %out.display(),
        ?min_range,
        ?target,
        ?tag,
        "diagram"
    );
    let table = input::load_table(input)?;

    let mut cfg = CpdCfg::default();
    if let Some(m) = min_range {
        cfg = cfg.with_min_range(m);
    }
    if exact_sentinel {
        cfg = cfg.with_boundary_test(BoundaryTest::ExactSentinel);
    }
    let cpd =
        ChemPotDiag::with_cfg(table, cfg).context("building chemical potential diagram")?;
    let target = target
        .map(Composition::parse)
        .transpose()
        .context("parsing target formula")?;
    let info =
        CpdPlotInfo::new(&cpd, target.as_ref(), None).context("extracting compound facets")?;
    tracing::info!(
        dim = cpd.dim(),
        vertices = cpd.vertex_coords().len(),
        stable = info.comp_vertices().len(),
        "diagram built"
    );

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let doc = DiagramReport::new(&cpd, &info);
    std::fs::write(out, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", out.display()))?;

    let params = Params {
        input: input.to_string_lossy().into_owned(),
        min_range: cfg.min_range,
        target: target.map(|c| c.reduced_formula()),
        boundary_test: format!("{:?}", cfg.boundary_test),
    };
    write_sidecar(out, tag.as_deref(), &params, &RunSummary::new(&cpd, &info))?;
    Ok(())
}

fn report(tag: Option<String>) -> Result<()> {
    let obj = serde_json::json!({
        "code_rev": provenance::code_rev(),
        "chempot_version": chempot::VERSION,
        "tag": tag,
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn diagram_writes_result_and_sidecar() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("table.json");
        fs::write(&input, r#"{"A": -2.0, "B": -3.0, "AB": -12.0}"#).unwrap();
        let out = dir.path().join("out").join("cpd.json");
        diagram(&input, &out, Some(-100.0), Some("AB"), false, None).unwrap();

        let doc: Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
        assert_eq!(doc["min_range"], -100.0);
        assert_eq!(doc["target_vertices"].as_array().unwrap().len(), 2);
        let prov = dir.path().join("out").join("cpd.provenance.json");
        let prov: Value = serde_json::from_slice(&fs::read(prov).unwrap()).unwrap();
        assert_eq!(prov["params"]["target"], "AB");
        assert_eq!(prov["run"]["dim"], 2);
        assert_eq!(prov["run"]["true_vertices"], 2);
    }

    #[test]
    fn unstable_target_fails() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("table.json");
        let table = r#"{"A": -2.0, "B": -3.0, "AB": -12.0, "A2B": -10.0}"#;
        fs::write(&input, table).unwrap();
        let out = dir.path().join("cpd.json");
        let err = diagram(&input, &out, Some(-100.0), Some("A2B"), false, None).unwrap_err();
        let root = err.root_cause().to_string();
        assert!(root.contains("A2B"), "{root}");
        assert!(!out.exists());
    }
}
