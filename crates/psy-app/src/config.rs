//! Run configuration: solver settings per mode, guess strategy, execution mode.
//!
//! ```yaml
//! wet_bulb:
//!   tolerance: 1.0e-6
//!   max_iterations: 50
//!   rh_reference: dry-bulb
//! dew_point:
//!   max_iterations: 500
//! initial_guess: dew-point
//! execution: parallel
//! ```

use std::path::Path;

use psy_models::InversionConfig;
use psy_solver::{InitialGuessStrategy, RhReference, SolverConfig};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, AppResult};

/// How the catalog is walked during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    /// One rayon task per formula; results reassembled in catalog order.
    Parallel,
}

/// Options for a single session run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunOptions {
    pub solver: SolverConfig,
    pub execution: ExecutionMode,
}

impl RunOptions {
    pub fn new(solver: SolverConfig) -> Self {
        Self {
            solver,
            execution: ExecutionMode::Sequential,
        }
    }

    pub fn parallel(self) -> Self {
        Self {
            execution: ExecutionMode::Parallel,
            ..self
        }
    }

    /// Bisection settings derived from the solver tolerance and budget.
    pub fn inversion(&self) -> InversionConfig {
        InversionConfig {
            max_iterations: self.solver.max_iterations,
            tolerance: self.solver.tolerance,
            ..InversionConfig::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Used by wet-bulb and dual (relative humidity) runs.
    pub wet_bulb: SolverConfig,
    /// Used by dew-point runs; the budget drives the bisection inverse.
    #[serde(default = "dew_point_defaults", deserialize_with = "deserialize_dew_point")]
    pub dew_point: SolverConfig,
    pub initial_guess: InitialGuessStrategy,
    pub execution: ExecutionMode,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            wet_bulb: SolverConfig::wet_bulb(),
            dew_point: SolverConfig::dew_point(),
            initial_guess: InitialGuessStrategy::default(),
            execution: ExecutionMode::default(),
        }
    }
}

fn dew_point_defaults() -> SolverConfig {
    SolverConfig::dew_point()
}

/// Partial solver block whose missing fields come from the dew-point defaults.
#[derive(Deserialize)]
struct PartialSolverConfig {
    tolerance: Option<f64>,
    max_iterations: Option<usize>,
    rh_reference: Option<RhReference>,
}

fn deserialize_dew_point<'de, D>(deserializer: D) -> Result<SolverConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let partial = PartialSolverConfig::deserialize(deserializer)?;
    let defaults = SolverConfig::dew_point();
    Ok(SolverConfig {
        tolerance: partial.tolerance.unwrap_or(defaults.tolerance),
        max_iterations: partial.max_iterations.unwrap_or(defaults.max_iterations),
        rh_reference: partial.rh_reference.unwrap_or(defaults.rh_reference),
    })
}

impl RunConfig {
    pub fn wet_bulb_options(&self) -> RunOptions {
        RunOptions {
            solver: self.wet_bulb,
            execution: self.execution,
        }
    }

    pub fn dew_point_options(&self) -> RunOptions {
        RunOptions {
            solver: self.dew_point,
            execution: self.execution,
        }
    }

    /// Apply a precision dial setting (tolerance `10^-digits`) to both modes.
    pub fn with_precision_digits(self, digits: u32) -> AppResult<Self> {
        Ok(Self {
            wet_bulb: self.wet_bulb.with_precision_digits(digits)?,
            dew_point: self.dew_point.with_precision_digits(digits)?,
            ..self
        })
    }

    /// Starting wet-bulb temperature when the dew point is known.
    pub fn guess_from_dew_point(&self, dry_bulb_c: f64, dew_point_c: f64) -> f64 {
        self.initial_guess.initial_guess(dry_bulb_c, dew_point_c)
    }

    /// Starting wet-bulb temperature when relative humidity [%] is known.
    ///
    /// Falls back to the dry-bulb offset when no dew point estimate exists.
    pub fn guess_from_relative_humidity(&self, dry_bulb_c: f64, rh_percent: f64) -> f64 {
        self.initial_guess
            .initial_guess_from_rh(dry_bulb_c, rh_percent / 100.0)
            .unwrap_or_else(|| {
                InitialGuessStrategy::DryBulbOffset.initial_guess(dry_bulb_c, dry_bulb_c)
            })
    }

    pub fn validate(&self) -> AppResult<()> {
        self.wet_bulb.validate()?;
        self.dew_point.validate()?;
        Ok(())
    }
}

/// Parse a run config from YAML text. Missing fields take their defaults.
pub fn parse_run_config(content: &str) -> AppResult<RunConfig> {
    let config: RunConfig = serde_yaml::from_str(content)
        .map_err(|e| AppError::Config(format!("Failed to parse run config YAML: {}", e)))?;
    config.validate()?;
    Ok(config)
}

/// Load a run config from a YAML file.
pub fn load_run_config(path: &Path) -> AppResult<RunConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_run_config(&content)
}
