//! Error taxonomy for diagram construction.

use thiserror::Error;

/// Failure to parse a chemical formula string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("empty formula")]
    Empty,

    #[error("unexpected character '{ch}' at byte {pos} in '{formula}'")]
    UnexpectedChar {
        formula: String,
        ch: char,
        pos: usize,
    },

    #[error("invalid count '{count}' in '{formula}'")]
    BadCount { formula: String, count: String },

    #[error("unbalanced parenthesis in '{formula}'")]
    Unbalanced { formula: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CpdError {
    #[error("no elemental reference for {element}: no compound reduces to it")]
    MissingReference { element: String },

    #[error("interior point is not strictly feasible: {reason}")]
    InfeasibleRegion { reason: String },

    #[error("degenerate geometry in {dim} dimensions: {reason}")]
    DegenerateGeometry { dim: usize, reason: String },

    #[error("{formula} has no stable region in this diagram")]
    TargetNotFound { formula: String },

    #[error("energy table is empty")]
    EmptyTable,

    #[error("energy of {formula} is not finite")]
    NonFiniteEnergy { formula: String },

    #[error("invalid formula: {0}")]
    Formula(#[from] FormulaError),
}

pub type Result<T> = std::result::Result<T, CpdError>;
