//! Wet-bulb solver for psychrometric queries.
//!
//! This crate provides a scalar Newton-Raphson driver for the psychrometric
//! energy balance. It is formula-agnostic: a catalog entry from
//! `psy-models` supplies `esat` and its derivative, and every numerical
//! failure is reported as an [`Outcome`] so one formula cannot abort a batch.

pub mod error;
pub mod initialization;
pub mod newton;
pub mod outcome;
pub mod psychrometric;

pub use error::{SolverError, SolverResult};
pub use initialization::{InitialGuessStrategy, magnus_dew_point};
pub use newton::{
    MIN_CONVERGED_ITERATION, RESIDUAL_CEILING, RH_REFERENCE, RhReference, SolverConfig,
    WetBulbProblem, WetBulbSolution, relative_humidity, solve_wet_bulb,
};
pub use outcome::{IterationRecord, Outcome};
pub use psychrometric::{
    Balance, PSYCHROMETRIC_A, PSYCHROMETRIC_B, balance, psychrometric_coefficient,
    vapour_pressure_from_wet_bulb,
};
