//! Saturation pressure sweeps.
//!
//! Tabulates `esat` and its derivative for one formula over a temperature
//! range. Points outside the formula's validity interval are still
//! evaluated where the maths allows, but flagged.

use std::fmt;

use crate::catalog::FormulaEntry;
use crate::error::{ModelError, ModelResult};

/// Uniformly spaced temperature points [°C].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureSweep {
    pub start_c: f64,
    pub end_c: f64,
    pub num_points: usize,
}

impl TemperatureSweep {
    pub fn new(start_c: f64, end_c: f64, num_points: usize) -> ModelResult<Self> {
        if !(start_c.is_finite() && end_c.is_finite()) {
            return Err(ModelError::InvalidArg {
                what: "sweep bounds must be finite",
            });
        }
        if num_points < 2 {
            return Err(ModelError::InvalidArg {
                what: "sweep must have at least 2 points",
            });
        }
        if (start_c - end_c).abs() < 1e-12 {
            return Err(ModelError::InvalidArg {
                what: "sweep start and end must differ",
            });
        }
        Ok(Self {
            start_c,
            end_c,
            num_points,
        })
    }

    /// Sweep spanning a formula's whole validity interval.
    pub fn over_validity(entry: &FormulaEntry, num_points: usize) -> ModelResult<Self> {
        Self::new(entry.validity.min_c, entry.validity.max_c, num_points)
    }

    pub fn points(&self) -> Vec<f64> {
        let delta = (self.end_c - self.start_c) / (self.num_points - 1) as f64;
        let mut points: Vec<f64> = (0..self.num_points)
            .map(|i| self.start_c + i as f64 * delta)
            .collect();

        // Ensure exact endpoint
        if let Some(last) = points.last_mut() {
            *last = self.end_c;
        }
        points
    }
}

impl fmt::Display for TemperatureSweep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {} °C ({} points)",
            self.start_c, self.end_c, self.num_points
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SweepPoint {
    pub temperature_c: f64,
    /// `None` when evaluation failed at this temperature.
    pub esat_hpa: Option<f64>,
    pub desat_dt: Option<f64>,
    pub in_range: bool,
}

/// Evaluate `entry` at every point of `sweep`.
pub fn tabulate(entry: &FormulaEntry, sweep: &TemperatureSweep) -> Vec<SweepPoint> {
    sweep
        .points()
        .into_iter()
        .map(|t| SweepPoint {
            temperature_c: t,
            esat_hpa: entry.esat(t).ok(),
            desat_dt: entry.desat_dt(t).ok(),
            in_range: entry.is_valid_at(t),
        })
        .collect()
}
