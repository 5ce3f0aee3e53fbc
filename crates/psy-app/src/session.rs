//! Calculation sessions: one query solved by every formula in the catalog.
//!
//! A session is built once by one of the three run modes and is an
//! immutable snapshot afterwards. It always holds exactly one row per
//! catalog entry, in catalog order, whatever happened to each formula.

use std::collections::BTreeMap;

use psy_core::{ensure_finite, ensure_positive};
use psy_models::{FormulaEntry, FormulaId, ModelError, formula_catalog, invert_esat};
use psy_solver::{
    IterationRecord, Outcome, RhReference, SolverConfig, WetBulbProblem, relative_humidity,
    solve_wet_bulb, vapour_pressure_from_wet_bulb,
};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ExecutionMode, RunOptions};
use crate::error::{AppError, AppResult};

/// Which unknown a session solved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolveMode {
    /// Dry bulb + dew point -> wet bulb
    WetBulb,
    /// Dry bulb + wet bulb -> dew point
    DewPoint,
    /// Dry bulb + relative humidity -> dew point and wet bulb
    Both,
}

/// Caller inputs, kept on the session for later drill-down. °C, hPa.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionInputs {
    pub mode: SolveMode,
    pub dry_bulb_c: f64,
    /// Known dew point (wet-bulb mode).
    pub dew_point_c: Option<f64>,
    /// Known wet bulb (dew-point mode).
    pub wet_bulb_c: Option<f64>,
    /// Known relative humidity as a fraction (dual mode).
    pub relative_humidity: Option<f64>,
    pub initial_guess_c: Option<f64>,
    pub pressure_hpa: f64,
}

/// A numeric temperature or a symbolic failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum ResultValue {
    Temperature(f64),
    Failure(Outcome),
}

impl ResultValue {
    pub fn outcome(&self) -> Outcome {
        match self {
            ResultValue::Temperature(_) => Outcome::Success,
            ResultValue::Failure(outcome) => *outcome,
        }
    }

    pub fn temperature(&self) -> Option<f64> {
        match self {
            ResultValue::Temperature(t) => Some(*t),
            ResultValue::Failure(_) => None,
        }
    }
}

impl From<Outcome> for ResultValue {
    fn from(outcome: Outcome) -> Self {
        ResultValue::Failure(outcome)
    }
}

/// One formula's row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEntry {
    pub formula: FormulaId,
    /// Wet bulb in wet-bulb mode, dew point in dew-point and dual mode.
    pub primary: ResultValue,
    /// Wet bulb in dual mode.
    pub secondary: Option<ResultValue>,
    /// Fraction in [0, 1]; only set alongside a numeric primary.
    pub relative_humidity: Option<f64>,
}

impl ResultEntry {
    fn failed(formula: FormulaId, outcome: Outcome) -> Self {
        Self {
            formula,
            primary: outcome.into(),
            secondary: None,
            relative_humidity: None,
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.primary.outcome()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationSession {
    inputs: SessionInputs,
    results: Vec<ResultEntry>,
    iterations: BTreeMap<FormulaId, Vec<IterationRecord>>,
}

/// Per-formula output before assembly.
type Row = (ResultEntry, Option<Vec<IterationRecord>>);

impl CalculationSession {
    pub fn inputs(&self) -> &SessionInputs {
        &self.inputs
    }

    /// Rows in catalog order.
    pub fn results(&self) -> &[ResultEntry] {
        &self.results
    }

    /// Newton history for one formula; empty when no Newton iteration ran.
    pub fn iterations_for(&self, formula: FormulaId) -> &[IterationRecord] {
        self.iterations
            .get(&formula)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iterations(&self) -> &BTreeMap<FormulaId, Vec<IterationRecord>> {
        &self.iterations
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    fn assemble(inputs: SessionInputs, rows: Vec<Row>) -> Self {
        let mut results = Vec::with_capacity(rows.len());
        let mut iterations = BTreeMap::new();
        for (entry, history) in rows {
            debug!(formula = %entry.formula, outcome = %entry.outcome(), "formula finished");
            if let Some(history) = history {
                iterations.insert(entry.formula, history);
            }
            results.push(entry);
        }
        Self {
            inputs,
            results,
            iterations,
        }
    }

    /// Wet bulb from dry bulb and dew point.
    pub fn run_wet_bulb(
        initial_guess_c: f64,
        dry_bulb_c: f64,
        dew_point_c: f64,
        pressure_hpa: f64,
        options: &RunOptions,
    ) -> AppResult<Self> {
        validate_common(dry_bulb_c, pressure_hpa, options)?;
        require_finite(initial_guess_c, "initial guess")?;
        require_finite(dew_point_c, "dew point")?;
        if dew_point_c >= dry_bulb_c {
            return reject(format!(
                "dew point {dew_point_c} °C must be below dry bulb {dry_bulb_c} °C"
            ));
        }

        let rows = map_catalog(options.execution, |formula| {
            wet_bulb_row(formula, initial_guess_c, dry_bulb_c, dew_point_c, pressure_hpa, options)
        })?;

        let inputs = SessionInputs {
            mode: SolveMode::WetBulb,
            dry_bulb_c,
            dew_point_c: Some(dew_point_c),
            wet_bulb_c: None,
            relative_humidity: None,
            initial_guess_c: Some(initial_guess_c),
            pressure_hpa,
        };
        Ok(Self::assemble(inputs, rows))
    }

    /// Dew point from dry bulb and wet bulb.
    pub fn run_dew_point(
        dry_bulb_c: f64,
        wet_bulb_c: f64,
        pressure_hpa: f64,
        options: &RunOptions,
    ) -> AppResult<Self> {
        validate_common(dry_bulb_c, pressure_hpa, options)?;
        require_finite(wet_bulb_c, "wet bulb")?;
        if wet_bulb_c > dry_bulb_c {
            return reject(format!(
                "wet bulb {wet_bulb_c} °C must not exceed dry bulb {dry_bulb_c} °C"
            ));
        }

        let rows = map_catalog(options.execution, |formula| {
            Ok((
                dew_point_row(formula, dry_bulb_c, wet_bulb_c, pressure_hpa, options),
                None,
            ))
        })?;

        let inputs = SessionInputs {
            mode: SolveMode::DewPoint,
            dry_bulb_c,
            dew_point_c: None,
            wet_bulb_c: Some(wet_bulb_c),
            relative_humidity: None,
            initial_guess_c: None,
            pressure_hpa,
        };
        Ok(Self::assemble(inputs, rows))
    }

    /// Dew point and wet bulb from dry bulb and relative humidity [%].
    ///
    /// The humidity is always taken against the dry-bulb saturation pressure.
    pub fn run_both(
        initial_guess_c: f64,
        dry_bulb_c: f64,
        relative_humidity_percent: f64,
        pressure_hpa: f64,
        options: &RunOptions,
    ) -> AppResult<Self> {
        validate_common(dry_bulb_c, pressure_hpa, options)?;
        require_finite(initial_guess_c, "initial guess")?;
        require_finite(relative_humidity_percent, "relative humidity")?;
        if !(0.0..=100.0).contains(&relative_humidity_percent) {
            return reject(format!(
                "relative humidity {relative_humidity_percent} % must be within 0..=100"
            ));
        }
        let rh = relative_humidity_percent / 100.0;

        let rows = map_catalog(options.execution, |formula| {
            both_row(formula, initial_guess_c, dry_bulb_c, rh, pressure_hpa, options)
        })?;

        let inputs = SessionInputs {
            mode: SolveMode::Both,
            dry_bulb_c,
            dew_point_c: None,
            wet_bulb_c: None,
            relative_humidity: Some(rh),
            initial_guess_c: Some(initial_guess_c),
            pressure_hpa,
        };
        Ok(Self::assemble(inputs, rows))
    }
}

fn reject<T>(message: String) -> AppResult<T> {
    warn!(%message, "rejected session input");
    Err(AppError::InvalidInput(message))
}

fn require_finite(value: f64, what: &'static str) -> AppResult<()> {
    match ensure_finite(value, what) {
        Ok(_) => Ok(()),
        Err(err) => reject(err.to_string()),
    }
}

fn validate_common(dry_bulb_c: f64, pressure_hpa: f64, options: &RunOptions) -> AppResult<()> {
    require_finite(dry_bulb_c, "dry bulb")?;
    if let Err(err) = ensure_positive(pressure_hpa, "pressure") {
        return reject(err.to_string());
    }
    if let Err(err) = options.solver.validate() {
        return reject(err.to_string());
    }
    Ok(())
}

/// Run `solve` for every catalog entry, keeping catalog order.
fn map_catalog<F>(execution: ExecutionMode, solve: F) -> AppResult<Vec<Row>>
where
    F: Fn(&FormulaEntry) -> AppResult<Row> + Sync + Send,
{
    let catalog = formula_catalog();
    match execution {
        ExecutionMode::Sequential => catalog.iter().map(solve).collect(),
        ExecutionMode::Parallel => catalog.par_iter().map(solve).collect(),
    }
}

fn wet_bulb_row(
    formula: &FormulaEntry,
    initial_guess_c: f64,
    dry_bulb_c: f64,
    dew_point_c: f64,
    pressure_hpa: f64,
    options: &RunOptions,
) -> AppResult<Row> {
    if !formula.is_valid_at(initial_guess_c) {
        return Ok((ResultEntry::failed(formula.id, Outcome::NotApplicable), None));
    }
    let e = match formula.esat(dew_point_c) {
        Ok(e) => e,
        Err(err) => return Ok((failed_on(formula, &err), None)),
    };

    let problem = WetBulbProblem {
        initial_guess_c,
        dry_bulb_c,
        vapour_pressure_hpa: e,
        pressure_hpa,
    };
    let solution = solve_wet_bulb(formula, &problem, &options.solver)?;

    let entry = match (solution.outcome, solution.wet_bulb_c) {
        (Outcome::Success, Some(tw)) => ResultEntry {
            formula: formula.id,
            primary: ResultValue::Temperature(tw),
            secondary: None,
            relative_humidity: solution.relative_humidity,
        },
        (outcome, _) => ResultEntry::failed(formula.id, outcome),
    };
    Ok((entry, Some(solution.history)))
}

fn dew_point_row(
    formula: &FormulaEntry,
    dry_bulb_c: f64,
    wet_bulb_c: f64,
    pressure_hpa: f64,
    options: &RunOptions,
) -> ResultEntry {
    if !(formula.is_valid_at(wet_bulb_c) || formula.is_valid_at(dry_bulb_c)) {
        return ResultEntry::failed(formula.id, Outcome::NotApplicable);
    }

    let evaluated = vapour_pressure_from_wet_bulb(formula, dry_bulb_c, wet_bulb_c, pressure_hpa)
        .and_then(|e| Ok((e, formula.esat(dry_bulb_c)?)))
        .and_then(|(e, es_dry)| {
            let rh = relative_humidity(
                formula,
                options.solver.rh_reference,
                dry_bulb_c,
                wet_bulb_c,
                e,
            )?;
            Ok((e, es_dry, rh))
        });
    let (e, es_dry, rh) = match evaluated {
        Ok(values) => values,
        Err(err) => return failed_on(formula, &err),
    };

    // Saturated: no inversion needed.
    if e >= es_dry || rh >= 1.0 {
        return ResultEntry {
            formula: formula.id,
            primary: ResultValue::Temperature(dry_bulb_c),
            secondary: None,
            relative_humidity: Some(1.0),
        };
    }
    if rh < 0.0 {
        return ResultEntry::failed(formula.id, Outcome::PhysicallyInvalid);
    }

    let dew_point_c = match invert_esat(e, &formula.model, &options.inversion()) {
        Ok(inversion) => inversion.temperature_c,
        Err(ModelError::DivisionByZero { .. }) => dry_bulb_c,
        Err(err) => return failed_on(formula, &err),
    };
    ResultEntry {
        formula: formula.id,
        primary: ResultValue::Temperature(dew_point_c),
        secondary: None,
        relative_humidity: Some(rh),
    }
}

fn both_row(
    formula: &FormulaEntry,
    initial_guess_c: f64,
    dry_bulb_c: f64,
    rh: f64,
    pressure_hpa: f64,
    options: &RunOptions,
) -> AppResult<Row> {
    if !formula.is_valid_at(dry_bulb_c) {
        return Ok((ResultEntry::failed(formula.id, Outcome::NotApplicable), None));
    }
    let e = match formula.esat(dry_bulb_c) {
        Ok(es) => es * rh,
        Err(err) => return Ok((failed_on(formula, &err), None)),
    };

    let primary = match invert_esat(e, &formula.model, &options.inversion()) {
        Ok(inversion) => ResultValue::Temperature(inversion.temperature_c),
        Err(ModelError::DivisionByZero { .. }) => ResultValue::Temperature(dry_bulb_c),
        Err(err) => ResultValue::Failure(Outcome::from(&err)),
    };

    let problem = WetBulbProblem {
        initial_guess_c,
        dry_bulb_c,
        vapour_pressure_hpa: e,
        pressure_hpa,
    };
    // The input humidity is already dry-bulb referenced.
    let solver = SolverConfig {
        rh_reference: RhReference::DryBulb,
        ..options.solver
    };
    let solution = solve_wet_bulb(formula, &problem, &solver)?;
    let secondary = match (solution.outcome, solution.wet_bulb_c) {
        (Outcome::Success, Some(tw)) => ResultValue::Temperature(tw),
        (outcome, _) => ResultValue::Failure(outcome),
    };

    let relative_humidity = primary.temperature().map(|_| rh);
    let entry = ResultEntry {
        formula: formula.id,
        primary,
        secondary: Some(secondary),
        relative_humidity,
    };
    Ok((entry, Some(solution.history)))
}

fn failed_on(formula: &FormulaEntry, err: &ModelError) -> ResultEntry {
    let outcome = Outcome::from(err);
    debug!(formula = %formula.id, error = %err, %outcome, "evaluation failed");
    ResultEntry::failed(formula.id, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use psy_models::Surface;

    fn wet_bulb_options() -> RunOptions {
        RunOptions::new(SolverConfig::wet_bulb())
    }

    #[test]
    fn one_row_per_formula_in_catalog_order() {
        let session =
            CalculationSession::run_wet_bulb(10.0, 20.0, 10.0, 1013.25, &wet_bulb_options())
                .unwrap();
        let ids: Vec<FormulaId> = session.results().iter().map(|r| r.formula).collect();
        assert_eq!(ids, FormulaId::ALL.to_vec());
    }

    #[test]
    fn not_applicable_rows_have_no_history() {
        let session =
            CalculationSession::run_wet_bulb(-25.0, -20.0, -25.0, 1013.25, &wet_bulb_options())
                .unwrap();
        for row in session.results() {
            if row.outcome() == Outcome::NotApplicable {
                assert!(session.iterations_for(row.formula).is_empty());
            }
        }
    }

    #[test]
    fn ice_formulas_handle_cold_air() {
        let session =
            CalculationSession::run_wet_bulb(-25.0, -20.0, -25.0, 1013.25, &wet_bulb_options())
                .unwrap();
        for (row, entry) in session.results().iter().zip(formula_catalog()) {
            match entry.surface {
                Surface::Water => assert_eq!(row.outcome(), Outcome::NotApplicable),
                Surface::Ice => {
                    assert_eq!(row.outcome(), Outcome::Success, "{}", entry.name());
                    let tw = row.primary.temperature().unwrap();
                    assert!((tw + 20.53).abs() < 0.05, "{}: {tw}", entry.name());
                }
            }
        }
    }

    #[test]
    fn dew_point_mode_has_no_newton_history() {
        let session = CalculationSession::run_dew_point(
            20.0,
            14.24,
            1013.25,
            &RunOptions::new(SolverConfig::dew_point()),
        )
        .unwrap();
        assert!(session.iterations().is_empty());
        assert_eq!(session.len(), 14);
    }

    #[test]
    fn dual_mode_reports_both_temperatures() {
        let session =
            CalculationSession::run_both(10.0, 20.0, 52.507, 1013.25, &wet_bulb_options())
                .unwrap();
        let goff = &session.results()[0];
        assert_eq!(goff.formula, FormulaId::GoffWater);
        let td = goff.primary.temperature().unwrap();
        let tw = goff.secondary.unwrap().temperature().unwrap();
        assert!((td - 10.0).abs() < 0.01, "td = {td}");
        assert!((tw - 14.24).abs() < 0.01, "tw = {tw}");
        assert!((goff.relative_humidity.unwrap() - 0.525_07).abs() < 1e-12);
    }

    #[test]
    fn rejected_inputs() {
        let options = wet_bulb_options();
        assert!(matches!(
            CalculationSession::run_wet_bulb(10.0, 20.0, 20.0, 1013.25, &options),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            CalculationSession::run_wet_bulb(10.0, 20.0, 10.0, f64::INFINITY, &options),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            CalculationSession::run_dew_point(20.0, 21.0, 1013.25, &options),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            CalculationSession::run_both(10.0, 20.0, 120.0, 1013.25, &options),
            Err(AppError::InvalidInput(_))
        ));
        let zero_budget = RunOptions::new(SolverConfig {
            max_iterations: 0,
            ..SolverConfig::wet_bulb()
        });
        assert!(matches!(
            CalculationSession::run_wet_bulb(10.0, 20.0, 10.0, 1013.25, &zero_budget),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn result_value_serializes_with_tag() {
        let json = serde_json::to_string(&ResultValue::Temperature(1.5)).unwrap();
        assert_eq!(json, r#"{"kind":"temperature","value":1.5}"#);
        let json = serde_json::to_string(&ResultValue::Failure(Outcome::NotConverged)).unwrap();
        assert_eq!(json, r#"{"kind":"failure","value":"NotConverged"}"#);
    }
}
