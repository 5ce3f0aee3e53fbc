//! Scalar Newton-Raphson wet-bulb solver.
//!
//! The driver is formula-agnostic: every catalog entry goes through the same
//! loop, parameterised only by its [`FormulaEntry`]. Numerical trouble ends
//! the solve with an [`Outcome`] rather than an error.

use psy_models::{FormulaEntry, ModelError};
use tracing::{debug, trace};

use crate::error::{SolverError, SolverResult};
use crate::outcome::{IterationRecord, Outcome};
use crate::psychrometric::balance;

/// Residual magnitude [hPa] above which the iteration is declared divergent.
pub const RESIDUAL_CEILING: f64 = 1000.0;

/// Zero-based iteration before which a small step is not accepted as convergence.
pub const MIN_CONVERGED_ITERATION: usize = 4;

/// Temperature whose saturation pressure normalises relative humidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RhReference {
    /// RH = e / esat(T_dry)
    #[default]
    DryBulb,
    /// RH = e / esat(T_wet)
    WetBulb,
}

/// Reference used unless a config overrides it.
pub const RH_REFERENCE: RhReference = RhReference::DryBulb;

/// Solver configuration, passed explicitly into every solve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverConfig {
    /// Step-size tolerance [°C]
    pub tolerance: f64,
    pub max_iterations: usize,
    pub rh_reference: RhReference,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::wet_bulb()
    }
}

impl SolverConfig {
    /// Defaults for wet-bulb and dual solves.
    pub fn wet_bulb() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 50,
            rh_reference: RH_REFERENCE,
        }
    }

    /// Defaults for dew-point solves; the budget feeds the bisection inverse.
    pub fn dew_point() -> Self {
        Self {
            max_iterations: 500,
            ..Self::wet_bulb()
        }
    }

    /// Tolerance `10^-digits`, for `digits` in 2..=10.
    pub fn with_precision_digits(self, digits: u32) -> SolverResult<Self> {
        if !(2..=10).contains(&digits) {
            return Err(SolverError::InvalidConfig {
                what: "precision digits must be in 2..=10",
            });
        }
        Ok(Self {
            tolerance: 10f64.powi(-(digits as i32)),
            ..self
        })
    }

    pub fn validate(&self) -> SolverResult<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SolverError::InvalidConfig {
                what: "tolerance must be finite and positive",
            });
        }
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidConfig {
                what: "max_iterations must be positive",
            });
        }
        Ok(())
    }
}

/// Inputs for one wet-bulb solve. Temperatures in °C, pressures in hPa.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WetBulbProblem {
    pub initial_guess_c: f64,
    pub dry_bulb_c: f64,
    /// Actual vapour pressure e [hPa]
    pub vapour_pressure_hpa: f64,
    pub pressure_hpa: f64,
}

impl WetBulbProblem {
    fn validate(&self) -> SolverResult<()> {
        let finite = [
            self.initial_guess_c,
            self.dry_bulb_c,
            self.vapour_pressure_hpa,
            self.pressure_hpa,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(SolverError::InvalidProblem {
                what: "inputs must be finite",
            });
        }
        if self.pressure_hpa <= 0.0 {
            return Err(SolverError::InvalidProblem {
                what: "pressure must be positive",
            });
        }
        Ok(())
    }
}

/// Result of one wet-bulb solve.
#[derive(Debug, Clone, PartialEq)]
pub struct WetBulbSolution {
    pub outcome: Outcome,
    /// Set for `Success` and `PhysicallyInvalid`.
    pub wet_bulb_c: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub history: Vec<IterationRecord>,
}

impl WetBulbSolution {
    fn terminal(outcome: Outcome, history: Vec<IterationRecord>) -> Self {
        Self {
            outcome,
            wet_bulb_c: None,
            relative_humidity: None,
            history,
        }
    }
}

/// Relative humidity of vapour pressure `e` against the configured reference.
pub fn relative_humidity(
    formula: &FormulaEntry,
    reference: RhReference,
    dry_bulb_c: f64,
    wet_bulb_c: f64,
    vapour_pressure_hpa: f64,
) -> Result<f64, ModelError> {
    let reference_t = match reference {
        RhReference::DryBulb => dry_bulb_c,
        RhReference::WetBulb => wet_bulb_c,
    };
    let es = formula.esat(reference_t)?;
    if es <= 0.0 {
        return Err(ModelError::DivisionByZero {
            what: "relative humidity",
        });
    }
    Ok(vapour_pressure_hpa / es)
}

/// Newton-Raphson on the psychrometric balance for one formula.
///
/// Returns `Err` only for invalid configuration or problem inputs.
pub fn solve_wet_bulb(
    formula: &FormulaEntry,
    problem: &WetBulbProblem,
    config: &SolverConfig,
) -> SolverResult<WetBulbSolution> {
    config.validate()?;
    problem.validate()?;

    let id = formula.id;
    if !formula.is_valid_at(problem.initial_guess_c) {
        debug!(formula = %id, guess = problem.initial_guess_c, "not applicable");
        return Ok(WetBulbSolution::terminal(Outcome::NotApplicable, Vec::new()));
    }

    let mut history = Vec::new();
    let mut tw = problem.initial_guess_c;

    for iter in 0..config.max_iterations {
        let step = match balance(
            formula,
            problem.dry_bulb_c,
            tw,
            problem.vapour_pressure_hpa,
            problem.pressure_hpa,
        ) {
            Ok(b) => b,
            Err(err) => {
                let outcome = Outcome::from(&err);
                debug!(formula = %id, iter, error = %err, %outcome, "evaluation failed");
                return Ok(WetBulbSolution::terminal(outcome, history));
            }
        };

        let residual = step.residual.abs();
        history.push(IterationRecord {
            formula: id,
            index: iter + 1,
            wet_bulb_c: tw,
            residual,
        });
        trace!(formula = %id, iter, tw, residual, "newton step");

        let tw_new = tw - step.residual / step.slope;
        if !tw_new.is_finite() {
            let outcome = if step.residual.is_infinite() || step.slope.is_infinite() {
                Outcome::NumericOverflow
            } else {
                Outcome::CalculationFailed
            };
            debug!(formula = %id, iter, %outcome, "non-finite newton update");
            return Ok(WetBulbSolution::terminal(outcome, history));
        }

        if (tw_new - tw).abs() < config.tolerance && iter >= MIN_CONVERGED_ITERATION {
            return Ok(finish(formula, problem, config, tw_new, history));
        }

        if residual > RESIDUAL_CEILING {
            debug!(formula = %id, iter, residual, "residual too large");
            return Ok(WetBulbSolution::terminal(
                Outcome::ResidualTooLarge,
                history,
            ));
        }

        tw = tw_new;
    }

    // Keep the last iterate visible for diagnostics.
    let final_residual = balance(
        formula,
        problem.dry_bulb_c,
        tw,
        problem.vapour_pressure_hpa,
        problem.pressure_hpa,
    )
    .map(|b| b.residual.abs())
    .unwrap_or(f64::NAN);
    history.push(IterationRecord {
        formula: id,
        index: config.max_iterations.saturating_add(1),
        wet_bulb_c: tw,
        residual: final_residual,
    });
    debug!(formula = %id, max_iterations = config.max_iterations, "not converged");
    Ok(WetBulbSolution::terminal(Outcome::NotConverged, history))
}

fn finish(
    formula: &FormulaEntry,
    problem: &WetBulbProblem,
    config: &SolverConfig,
    wet_bulb_c: f64,
    history: Vec<IterationRecord>,
) -> WetBulbSolution {
    let rh = match relative_humidity(
        formula,
        config.rh_reference,
        problem.dry_bulb_c,
        wet_bulb_c,
        problem.vapour_pressure_hpa,
    ) {
        Ok(rh) => rh,
        Err(err) => {
            let outcome = Outcome::from(&err);
            debug!(formula = %formula.id, error = %err, %outcome, "relative humidity failed");
            return WetBulbSolution::terminal(outcome, history);
        }
    };

    let outcome = if (0.0..=1.0).contains(&rh) {
        Outcome::Success
    } else {
        Outcome::PhysicallyInvalid
    };
    debug!(
        formula = %formula.id,
        wet_bulb_c,
        rh,
        iterations = history.len(),
        %outcome,
        "converged"
    );

    WetBulbSolution {
        outcome,
        wet_bulb_c: Some(wet_bulb_c),
        relative_humidity: Some(rh),
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psy_models::{FormulaId, ValidityRange, entry};

    fn scenario_one(id: FormulaId) -> (&'static FormulaEntry, WetBulbProblem) {
        let formula = entry(id);
        let problem = WetBulbProblem {
            initial_guess_c: 10.0,
            dry_bulb_c: 20.0,
            vapour_pressure_hpa: formula.esat(10.0).unwrap(),
            pressure_hpa: 1013.25,
        };
        (formula, problem)
    }

    #[test]
    fn goff_water_converges() {
        let (goff, problem) = scenario_one(FormulaId::GoffWater);
        let solution = solve_wet_bulb(goff, &problem, &SolverConfig::default()).unwrap();

        assert_eq!(solution.outcome, Outcome::Success);
        let tw = solution.wet_bulb_c.unwrap();
        assert!((tw - 14.2396).abs() < 1e-3, "tw = {tw}");
        let rh = solution.relative_humidity.unwrap();
        assert!((rh - 0.525_07).abs() < 1e-3, "rh = {rh}");
        assert_eq!(solution.history.len(), 5);
    }

    #[test]
    fn large_budget_does_not_preallocate_history() {
        let (goff, problem) = scenario_one(FormulaId::GoffWater);
        let config = SolverConfig {
            max_iterations: 1 << 40,
            ..SolverConfig::default()
        };
        let solution = solve_wet_bulb(goff, &problem, &config).unwrap();
        assert_eq!(solution.outcome, Outcome::Success);
        assert_eq!(solution.history.len(), 5);
        assert!(solution.history.capacity() < 1 << 20);
    }

    #[test]
    fn history_indices_are_one_based_and_increasing() {
        let (goff, problem) = scenario_one(FormulaId::GoffWater);
        let solution = solve_wet_bulb(goff, &problem, &SolverConfig::default()).unwrap();
        for (i, record) in solution.history.iter().enumerate() {
            assert_eq!(record.index, i + 1);
            assert_eq!(record.formula, FormulaId::GoffWater);
        }
        assert_eq!(solution.history[0].wet_bulb_c, 10.0);
    }

    #[test]
    fn wet_bulb_reference_changes_relative_humidity() {
        let (goff, problem) = scenario_one(FormulaId::GoffWater);
        let config = SolverConfig {
            rh_reference: RhReference::WetBulb,
            ..SolverConfig::default()
        };
        let solution = solve_wet_bulb(goff, &problem, &config).unwrap();
        let rh = solution.relative_humidity.unwrap();
        let expected = problem.vapour_pressure_hpa / goff.esat(solution.wet_bulb_c.unwrap()).unwrap();
        assert!((rh - expected).abs() < 1e-12);
        assert!(rh > 0.7 && rh < 0.8);
    }

    #[test]
    fn guess_outside_validity_is_not_applicable() {
        let (goff, mut problem) = scenario_one(FormulaId::GoffWater);
        problem.initial_guess_c = -25.0;
        let solution = solve_wet_bulb(goff, &problem, &SolverConfig::default()).unwrap();
        assert_eq!(solution.outcome, Outcome::NotApplicable);
        assert!(solution.history.is_empty());
    }

    #[test]
    fn exhausted_budget_is_not_converged() {
        let (goff, problem) = scenario_one(FormulaId::GoffWater);
        let config = SolverConfig {
            max_iterations: 3,
            ..SolverConfig::default()
        };
        let solution = solve_wet_bulb(goff, &problem, &config).unwrap();
        assert_eq!(solution.outcome, Outcome::NotConverged);
        assert_eq!(solution.wet_bulb_c, None);
        let indices: Vec<usize> = solution.history.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
    }

    #[test]
    fn huge_residual_stops_immediately() {
        let wexler = entry(FormulaId::WexlerWater);
        let problem = WetBulbProblem {
            initial_guess_c: 199.0,
            dry_bulb_c: 200.0,
            vapour_pressure_hpa: wexler.esat(150.0).unwrap(),
            pressure_hpa: 1013.25,
        };
        let solution = solve_wet_bulb(wexler, &problem, &SolverConfig::default()).unwrap();
        assert_eq!(solution.outcome, Outcome::ResidualTooLarge);
        assert_eq!(solution.history.len(), 1);
        assert!(solution.history[0].residual > RESIDUAL_CEILING);
    }

    #[test]
    fn overflow_is_reported() {
        // Magnus with its validity widened to reach the pole at T = -C
        let magnus = FormulaEntry {
            validity: ValidityRange::new(-300.0, 100.0),
            ..*entry(FormulaId::MagnusWater)
        };
        let problem = WetBulbProblem {
            initial_guess_c: -243.2,
            dry_bulb_c: 20.0,
            vapour_pressure_hpa: 5.0,
            pressure_hpa: 1013.25,
        };
        let solution = solve_wet_bulb(&magnus, &problem, &SolverConfig::default()).unwrap();
        assert_eq!(solution.outcome, Outcome::NumericOverflow);
    }

    #[test]
    fn supersaturated_vapour_is_physically_invalid() {
        let goff = entry(FormulaId::GoffWater);
        let problem = WetBulbProblem {
            initial_guess_c: 20.0,
            dry_bulb_c: 20.0,
            vapour_pressure_hpa: goff.esat(25.0).unwrap(),
            pressure_hpa: 1013.25,
        };
        let solution = solve_wet_bulb(goff, &problem, &SolverConfig::default()).unwrap();
        assert_eq!(solution.outcome, Outcome::PhysicallyInvalid);
        assert!(solution.relative_humidity.unwrap() > 1.0);
        assert!(solution.wet_bulb_c.is_some());
    }

    #[test]
    fn invalid_config_is_an_error() {
        let (goff, problem) = scenario_one(FormulaId::GoffWater);
        let zero_budget = SolverConfig {
            max_iterations: 0,
            ..SolverConfig::default()
        };
        assert!(matches!(
            solve_wet_bulb(goff, &problem, &zero_budget),
            Err(SolverError::InvalidConfig { .. })
        ));

        let mut bad = problem;
        bad.pressure_hpa = f64::NAN;
        assert!(matches!(
            solve_wet_bulb(goff, &bad, &SolverConfig::default()),
            Err(SolverError::InvalidProblem { .. })
        ));
    }

    #[test]
    fn precision_digits_set_tolerance() {
        let config = SolverConfig::default().with_precision_digits(4).unwrap();
        assert!((config.tolerance - 1e-4).abs() < 1e-18);
        assert!(SolverConfig::default().with_precision_digits(11).is_err());
        assert!(SolverConfig::default().with_precision_digits(1).is_err());
    }

    #[test]
    fn defaults_per_mode() {
        assert_eq!(SolverConfig::wet_bulb().max_iterations, 50);
        assert_eq!(SolverConfig::dew_point().max_iterations, 500);
        assert_eq!(SolverConfig::default().rh_reference, RH_REFERENCE);
    }
}
