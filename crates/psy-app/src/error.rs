//! Error types for the psy-app service layer.

use std::path::PathBuf;

/// Errors propagated out of a session.
///
/// Per-formula numerical failures never appear here; they are recorded as
/// outcomes on the session rows.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Row {index} out of range (session has {len} rows)")]
    RowNotFound { index: usize, len: usize },

    #[error("Formula not in session: {0}")]
    FormulaNotFound(String),

    #[error("Row {index} ({formula}) has no numeric result: {outcome}")]
    NoNumericResult {
        index: usize,
        formula: String,
        outcome: String,
    },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for psy-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<psy_models::ModelError> for AppError {
    fn from(err: psy_models::ModelError) -> Self {
        AppError::Model(err.to_string())
    }
}

impl From<psy_solver::SolverError> for AppError {
    fn from(err: psy_solver::SolverError) -> Self {
        match err {
            psy_solver::SolverError::InvalidConfig { what }
            | psy_solver::SolverError::InvalidProblem { what } => {
                AppError::InvalidInput(what.to_string())
            }
            other => AppError::Solver(other.to_string()),
        }
    }
}

impl From<psy_core::PsyError> for AppError {
    fn from(err: psy_core::PsyError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}
