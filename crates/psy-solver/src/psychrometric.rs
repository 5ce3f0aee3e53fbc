//! The psychrometric energy balance at the wet bulb.
//!
//! ```text
//! f(Tw)  = esat(Tw) - γ(Tw)·(T - Tw) - e
//! γ(Tw)  = A·(1 + B·Tw)·P
//! f'(Tw) = esat'(Tw) + γ(Tw) - A·B·P·(T - Tw)
//! ```
//!
//! with A = 6.67e-4 /°C and B = 1.15e-3 /°C, P in hPa.

use psy_models::{FormulaEntry, ModelError, ModelResult};

pub const PSYCHROMETRIC_A: f64 = 0.000_667;
pub const PSYCHROMETRIC_B: f64 = 0.001_15;

/// Psychrometric coefficient γ [hPa/°C].
#[inline]
pub fn psychrometric_coefficient(wet_bulb_c: f64, pressure_hpa: f64) -> f64 {
    PSYCHROMETRIC_A * (1.0 + PSYCHROMETRIC_B * wet_bulb_c) * pressure_hpa
}

/// Actual vapour pressure implied by a wet-bulb reading [hPa].
pub fn vapour_pressure_from_wet_bulb(
    formula: &FormulaEntry,
    dry_bulb_c: f64,
    wet_bulb_c: f64,
    pressure_hpa: f64,
) -> ModelResult<f64> {
    let gamma = psychrometric_coefficient(wet_bulb_c, pressure_hpa);
    let e = formula.esat(wet_bulb_c)? - gamma * (dry_bulb_c - wet_bulb_c);
    if e.is_finite() {
        Ok(e)
    } else {
        Err(ModelError::Overflow {
            what: "psychrometric vapour pressure",
        })
    }
}

/// Residual and slope of the balance at `wet_bulb_c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Balance {
    pub residual: f64,
    pub slope: f64,
}

pub fn balance(
    formula: &FormulaEntry,
    dry_bulb_c: f64,
    wet_bulb_c: f64,
    vapour_pressure_hpa: f64,
    pressure_hpa: f64,
) -> ModelResult<Balance> {
    let depression = dry_bulb_c - wet_bulb_c;
    let gamma = psychrometric_coefficient(wet_bulb_c, pressure_hpa);
    let residual = formula.esat(wet_bulb_c)? - gamma * depression - vapour_pressure_hpa;
    let slope = formula.desat_dt(wet_bulb_c)? + gamma
        - PSYCHROMETRIC_A * PSYCHROMETRIC_B * pressure_hpa * depression;
    Ok(Balance { residual, slope })
}
