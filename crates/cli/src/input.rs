//! Energy-table loading (JSON or CSV).
//!
//! JSON accepts either an object `{"MgO": -12.0, ...}` or an array of rows
//! `[{"formula": "MgO", "energy": -12.0}, ...]`; only the array keeps row
//! order. CSV needs `formula` and `energy` columns.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chempot::{Composition, EnergyTable};
use polars::prelude::*;
use serde::Deserialize;

#[derive(Deserialize)]
struct Row {
    formula: String,
    energy: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TableFile {
    Rows(Vec<Row>),
    Map(BTreeMap<String, f64>),
}

pub fn load_table(path: &Path) -> Result<EnergyTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let rows = match ext.as_deref() {
        Some("json") => read_json(path)?,
        Some("csv") => read_csv(path)?,
        _ => bail!(
            "unsupported table format: {} (expected .json or .csv)",
            path.display()
        ),
    };
    let mut table = EnergyTable::new();
    for (formula, energy) in rows {
        let comp = Composition::parse(&formula)
            .with_context(|| format!("parsing formula '{formula}'"))?;
        table
            .insert(comp, energy)
            .with_context(|| format!("adding {formula} to the table"))?;
    }
    tracing::info!(path = %path.display(), rows = table.len(), "loaded energy table");
    Ok(table)
}

fn read_json(path: &Path) -> Result<Vec<(String, f64)>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let file: TableFile =
        serde_json::from_slice(&bytes).with_context(|| format!("decoding {}", path.display()))?;
    Ok(match file {
        TableFile::Rows(rows) => rows.into_iter().map(|r| (r.formula, r.energy)).collect(),
        TableFile::Map(map) => map.into_iter().collect(),
    })
}

fn read_csv(path: &Path) -> Result<Vec<(String, f64)>> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(100))
        .finish()?
        .collect()
        .with_context(|| format!("reading {}", path.display()))?;
    let formulas = df.column("formula").context("missing 'formula' column")?.str()?;
    let energies = df
        .column("energy")
        .context("missing 'energy' column")?
        .cast(&DataType::Float64)?;
    let energies = energies.f64()?;
    let mut out = Vec::with_capacity(df.height());
    for (i, (f, e)) in formulas.into_iter().zip(energies.into_iter()).enumerate() {
        match (f, e) {
            (Some(f), Some(e)) => out.push((f.trim().to_string(), e)),
            _ => bail!("row {i} of {} has an empty formula or energy", path.display()),
        }
    }
    Ok(out)
}
