//! Per-formula outcome codes and iteration diagnostics.

use std::fmt;

use psy_models::{FormulaId, ModelError};

/// Closed set of results a single formula can end in.
///
/// None of these abort a session. The presentation layer maps each code to
/// its own display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// Starting temperature outside the formula's validity interval.
    NotApplicable,
    Success,
    /// Residual exceeded [`crate::RESIDUAL_CEILING`].
    ResidualTooLarge,
    NumericOverflow,
    NotConverged,
    /// Converged, but the implied relative humidity is outside [0, 1].
    PhysicallyInvalid,
    CalculationFailed,
}

impl Outcome {
    pub const ALL: [Outcome; 7] = [
        Outcome::NotApplicable,
        Outcome::Success,
        Outcome::ResidualTooLarge,
        Outcome::NumericOverflow,
        Outcome::NotConverged,
        Outcome::PhysicallyInvalid,
        Outcome::CalculationFailed,
    ];

    /// Stable symbolic code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::NotApplicable => "NotApplicable",
            Outcome::Success => "Success",
            Outcome::ResidualTooLarge => "ResidualTooLarge",
            Outcome::NumericOverflow => "NumericOverflow",
            Outcome::NotConverged => "NotConverged",
            Outcome::PhysicallyInvalid => "PhysicallyInvalid",
            Outcome::CalculationFailed => "CalculationFailed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ModelError> for Outcome {
    fn from(err: &ModelError) -> Self {
        match err {
            ModelError::Overflow { .. } => Outcome::NumericOverflow,
            _ => Outcome::CalculationFailed,
        }
    }
}

/// One Newton step, recorded before any termination check.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IterationRecord {
    pub formula: FormulaId,
    /// 1-based
    pub index: usize,
    pub wet_bulb_c: f64,
    /// |f(T_w)| [hPa]
    pub residual: f64,
}
