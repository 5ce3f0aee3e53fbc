//! Derived humidity and thermodynamic quantities for one committed result.
//!
//! Pure functions of (formula, dry bulb, dew point, wet bulb, pressure,
//! relative humidity, gravity). Denominators that can vanish or turn
//! negative go through [`guarded_div`] and yield zero.

use psy_core::units::constants::{EPSILON, KELVIN_OFFSET, P_REF_HPA, R_DRY_AIR, R_VAPOR};
use psy_core::{celsius_to_kelvin, guarded_div};
use psy_models::{FormulaEntry, FormulaId, formula};
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Specific heat of water vapour [J/(kg·K)]
pub const CP_VAPOR: f64 = 1864.0;

/// Bolton (1980) LCL constants for the relative-humidity form.
const BOLTON_OFFSET_K: f64 = 55.0;
const BOLTON_RH_SCALE: f64 = 2840.0;

/// Specific heat of dry air at constant pressure [J/(kg·K)], T in °C.
pub fn cp_dry_air(t_c: f64) -> f64 {
    1004.7463 + 0.05 * t_c
}

/// Latent heat of vaporisation [kJ/kg], T in °C.
pub fn latent_heat_vaporisation(t_c: f64) -> f64 {
    2500.8 - 2.3665 * t_c - 0.0023 * t_c.powi(2) + 1.87e-5 * t_c.powi(3) - 4.2e-8 * t_c.powi(4)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedQuantities {
    pub formula: FormulaId,
    pub dry_bulb_c: f64,
    pub dew_point_c: f64,
    pub wet_bulb_c: f64,
    pub pressure_hpa: f64,
    /// Fraction
    pub relative_humidity: f64,

    /// e = esat(T_dew) [hPa]
    pub vapour_pressure_hpa: f64,
    /// esat(T_dry) [hPa]
    pub saturation_vapour_pressure_hpa: f64,
    /// esat(T_wet) [hPa]
    pub wet_bulb_vapour_pressure_hpa: f64,
    pub dry_air_pressure_hpa: f64,

    /// [kg/m³]
    pub dry_air_density: f64,
    pub vapour_density: f64,
    pub moist_air_density: f64,

    /// [kg/kg]
    pub mixing_ratio: f64,
    pub saturation_mixing_ratio: f64,
    pub specific_humidity: f64,
    /// [g/m³]
    pub absolute_humidity: f64,

    /// [kJ/kg]
    pub latent_heat: f64,
    /// Moist-air enthalpy per kg dry air [kJ/kg]
    pub enthalpy: f64,

    /// [K]
    pub virtual_temperature_k: f64,
    pub potential_temperature_k: f64,
    pub equivalent_potential_temperature_k: f64,
    pub virtual_potential_temperature_k: f64,

    /// Lifted condensation level, `None` when undefined.
    pub lcl_temperature_c: Option<f64>,
    pub lcl_pressure_hpa: Option<f64>,
    pub lcl_height_m: Option<f64>,
}

/// Compute the extended report for one formula's committed result.
#[allow(clippy::too_many_arguments)]
pub fn derive_quantities(
    formula_name: &str,
    dry_bulb_c: f64,
    dew_point_c: f64,
    wet_bulb_c: f64,
    pressure_hpa: f64,
    relative_humidity: f64,
    gravity: f64,
) -> AppResult<DerivedQuantities> {
    let entry = formula(formula_name)?;
    derive_for_entry(
        entry,
        dry_bulb_c,
        dew_point_c,
        wet_bulb_c,
        pressure_hpa,
        relative_humidity,
        gravity,
    )
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn derive_for_entry(
    entry: &FormulaEntry,
    dry_bulb_c: f64,
    dew_point_c: f64,
    wet_bulb_c: f64,
    pressure_hpa: f64,
    relative_humidity: f64,
    gravity: f64,
) -> AppResult<DerivedQuantities> {
    let finite = [
        dry_bulb_c,
        dew_point_c,
        wet_bulb_c,
        pressure_hpa,
        relative_humidity,
        gravity,
    ]
    .iter()
    .all(|v| v.is_finite());
    if !finite {
        return Err(AppError::InvalidInput(
            "derived quantities need finite inputs".to_string(),
        ));
    }
    if pressure_hpa <= 0.0 || gravity <= 0.0 || dry_bulb_c <= -KELVIN_OFFSET {
        return Err(AppError::InvalidInput(format!(
            "pressure, gravity and absolute temperature must be positive \
             (P = {pressure_hpa} hPa, g = {gravity} m/s², T = {dry_bulb_c} °C)"
        )));
    }

    let t = dry_bulb_c;
    let tk = celsius_to_kelvin(t);
    let p = pressure_hpa;

    let e = entry.esat(dew_point_c)?;
    let es = entry.esat(dry_bulb_c)?;
    let esw = entry.esat(wet_bulb_c)?;
    let p_dry = p - e;

    let cp = cp_dry_air(t);
    let lv = latent_heat_vaporisation(t);
    let upsilon = (1.0 - EPSILON) / EPSILON;

    // hPa -> Pa for the gas law
    let rho_dry = guarded_div(p_dry * 100.0, R_DRY_AIR * tk).max(0.0);
    let rho_vapor = guarded_div(e * 100.0, R_VAPOR * tk);

    let w = guarded_div(EPSILON * e, p - e);
    let ws = guarded_div(EPSILON * es, p - es);
    let q = guarded_div(EPSILON * e, p - (1.0 - EPSILON) * e);

    let enthalpy = cp / 1000.0 * t + (lv + CP_VAPOR / 1000.0 * t) * w;

    let theta = tk * (P_REF_HPA / p).powf(R_DRY_AIR / cp);
    let theta_e = theta * (lv * 1000.0 * w / (cp * tk)).exp();
    let theta_v = theta * (1.0 + upsilon * q);

    let lcl_k = lcl_temperature_k(tk, relative_humidity);
    let lcl_pressure_hpa = lcl_k.map(|tl| p * (tl / tk).powf(cp / R_DRY_AIR));
    let lcl_height_m = lcl_k.map(|tl| cp / gravity * (tk - tl));

    Ok(DerivedQuantities {
        formula: entry.id,
        dry_bulb_c,
        dew_point_c,
        wet_bulb_c,
        pressure_hpa,
        relative_humidity,
        vapour_pressure_hpa: e,
        saturation_vapour_pressure_hpa: es,
        wet_bulb_vapour_pressure_hpa: esw,
        dry_air_pressure_hpa: p_dry,
        dry_air_density: rho_dry,
        vapour_density: rho_vapor,
        moist_air_density: rho_dry + rho_vapor,
        mixing_ratio: w,
        saturation_mixing_ratio: ws,
        specific_humidity: q,
        absolute_humidity: rho_vapor * 1000.0,
        latent_heat: lv,
        enthalpy,
        virtual_temperature_k: tk * (1.0 + upsilon * q),
        potential_temperature_k: theta,
        equivalent_potential_temperature_k: theta_e,
        virtual_potential_temperature_k: theta_v,
        lcl_temperature_c: lcl_k.map(|tl| tl - KELVIN_OFFSET),
        lcl_pressure_hpa,
        lcl_height_m,
    })
}

/// Bolton's LCL temperature [K] from absolute temperature and RH fraction.
fn lcl_temperature_k(tk: f64, rh: f64) -> Option<f64> {
    if rh.is_nan() || rh <= 0.0 {
        return None;
    }
    let denom = 1.0 / (tk - BOLTON_OFFSET_K) - rh.ln() / BOLTON_RH_SCALE;
    if denom <= 0.0 {
        return None;
    }
    let tl = 1.0 / denom + BOLTON_OFFSET_K;
    tl.is_finite().then_some(tl)
}
