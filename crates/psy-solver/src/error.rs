//! Error types for solver operations.

use psy_core::error::PsyError;
use psy_models::ModelError;
use thiserror::Error;

/// Errors that abort a solve before any iteration runs.
///
/// Numerical trouble during iteration is not an error; it is reported
/// through [`crate::Outcome`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Invalid solver configuration: {what}")]
    InvalidConfig { what: &'static str },

    #[error("Invalid problem: {what}")]
    InvalidProblem { what: &'static str },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for PsyError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::InvalidConfig { what } | SolverError::InvalidProblem { what } => {
                PsyError::InvalidArg { what }
            }
            SolverError::Model(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SolverError::InvalidConfig {
            what: "tolerance must be positive",
        };
        assert!(err.to_string().contains("tolerance"));
    }

    #[test]
    fn model_errors_convert() {
        let err: SolverError = ModelError::Domain { what: "log" }.into();
        assert!(matches!(err, SolverError::Model(_)));
        let psy: PsyError = err.into();
        assert!(matches!(psy, PsyError::NonFinite { .. }));
    }
}
