//! psy-models: saturation vapour pressure formulas for psychro.
//!
//! Provides:
//! - The fixed formula catalog (water and ice surfaces, validity intervals)
//! - `esat(T)` and `d esat / dT` per formula family
//! - Temperature recovery from a target vapour pressure (closed form or bisection)
//! - Tabulated esat sweeps
//!
//! # Example
//!
//! ```
//! use psy_models::{formula, invert_esat, InversionConfig};
//!
//! let goff = formula("goff-water").unwrap();
//! let e = goff.esat(10.0).unwrap();
//! let dew = invert_esat(e, &goff.model, &InversionConfig::default()).unwrap();
//! assert!((dew.temperature_c - 10.0).abs() < 1e-6);
//! ```

pub mod catalog;
pub mod error;
pub mod formula;
pub mod inverse;
pub mod saturation;
pub mod sweeps;

// Re-exports for ergonomics
pub use catalog::{FormulaEntry, desat_dt, entry, esat, find_formula, formula, formula_catalog};
pub use error::{ModelError, ModelResult};
pub use formula::{FormulaId, Surface, ValidityRange};
pub use inverse::{
    DEFAULT_BRACKET_C, Inversion, InversionConfig, InversionMethod, MIN_BISECTION_ITERATIONS,
    invert_esat,
};
pub use saturation::{DERIVATIVE_STEP_C, SaturationCurve, SaturationModel};
pub use sweeps::{SweepPoint, TemperatureSweep, tabulate};
