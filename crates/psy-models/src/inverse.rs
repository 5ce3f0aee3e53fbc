//! Temperature from a target saturation vapour pressure.
//!
//! Exponential-family formulas invert algebraically. Everything else is
//! bisected over a fixed bracket. Bisection only accepts a midpoint once the
//! residual is below tolerance *and* at least [`MIN_BISECTION_ITERATIONS`]
//! halvings have run; when the budget runs out first the last midpoint is
//! returned without error.

use crate::error::{ModelError, ModelResult};
use crate::saturation::SaturationModel;

/// Default search bracket [°C].
pub const DEFAULT_BRACKET_C: (f64, f64) = (-150.0, 200.0);

/// Bisection never accepts convergence before this many halvings.
pub const MIN_BISECTION_ITERATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InversionConfig {
    pub max_iterations: usize,
    /// Residual tolerance on `esat(T) - target` [hPa]
    pub tolerance: f64,
    /// Search bracket (lower, upper) [°C]
    pub bracket: (f64, f64),
}

impl Default for InversionConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-6,
            bracket: DEFAULT_BRACKET_C,
        }
    }
}

impl InversionConfig {
    pub fn validate(&self) -> ModelResult<()> {
        if self.max_iterations == 0 {
            return Err(ModelError::InvalidArg {
                what: "inversion iteration budget must be positive",
            });
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ModelError::InvalidArg {
                what: "inversion tolerance must be positive",
            });
        }
        let (lo, hi) = self.bracket;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(ModelError::InvalidArg {
                what: "inversion bracket must be finite and ordered",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum InversionMethod {
    ClosedForm,
    Bisection,
    /// Budget ran out before the acceptance test passed.
    BisectionExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Inversion {
    pub temperature_c: f64,
    pub iterations: usize,
    pub method: InversionMethod,
}

/// Solve `esat(T) = target_hpa` for T [°C].
///
/// Closed-form inversion surfaces `ModelError::DivisionByZero` and
/// `ModelError::Domain` unchanged; callers decide on a fallback.
pub fn invert_esat(
    target_hpa: f64,
    model: &SaturationModel,
    config: &InversionConfig,
) -> ModelResult<Inversion> {
    if let Some(coeffs) = model.closed_form() {
        return Ok(Inversion {
            temperature_c: coeffs.invert(target_hpa)?,
            iterations: 0,
            method: InversionMethod::ClosedForm,
        });
    }

    if target_hpa.is_nan() {
        return Err(ModelError::InvalidArg {
            what: "target vapour pressure is NaN",
        });
    }
    config.validate()?;
    bisect(target_hpa, model, config)
}

fn bisect(
    target_hpa: f64,
    model: &SaturationModel,
    config: &InversionConfig,
) -> ModelResult<Inversion> {
    let (mut lo, mut hi) = config.bracket;

    for iteration in 0..config.max_iterations {
        let mid = 0.5 * (lo + hi);
        let residual = model.esat(mid)? - target_hpa;

        if residual.abs() < config.tolerance && iteration + 1 >= MIN_BISECTION_ITERATIONS {
            return Ok(Inversion {
                temperature_c: mid,
                iterations: iteration + 1,
                method: InversionMethod::Bisection,
            });
        }

        if residual > 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    Ok(Inversion {
        temperature_c: 0.5 * (lo + hi),
        iterations: config.max_iterations,
        method: InversionMethod::BisectionExhausted,
    })
}
