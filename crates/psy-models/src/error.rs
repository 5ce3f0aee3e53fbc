//! Saturation model errors.

use psy_core::PsyError;
use thiserror::Error;

/// Result type for saturation model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while evaluating or inverting a saturation formula.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Formula name not present in the catalog.
    #[error("No such saturation model: {name}")]
    UnknownFormula { name: String },

    /// Exponential or power term left the representable range.
    #[error("Numeric overflow evaluating {what}")]
    Overflow { what: &'static str },

    /// Mathematical domain violation (log of a non-positive value, NaN result).
    #[error("Domain error evaluating {what}")]
    Domain { what: &'static str },

    /// Closed-form inversion hit a vanishing denominator.
    #[error("Division by zero in {what}")]
    DivisionByZero { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl ModelError {
    /// Classify a raw float produced while evaluating `what`.
    pub(crate) fn check(value: f64, what: &'static str) -> ModelResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else if value.is_nan() {
            Err(ModelError::Domain { what })
        } else {
            Err(ModelError::Overflow { what })
        }
    }
}

impl From<ModelError> for PsyError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::UnknownFormula { .. } => PsyError::InvalidArg {
                what: "unknown saturation formula",
            },
            ModelError::Overflow { what } | ModelError::Domain { what } => {
                PsyError::NonFinite { what, value: f64::NAN }
            }
            ModelError::DivisionByZero { what } | ModelError::InvalidArg { what } => {
                PsyError::InvalidArg { what }
            }
        }
    }
}
