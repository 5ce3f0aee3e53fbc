//! Query helpers for drilling into a finished session.

use std::collections::BTreeMap;

use psy_models::{FormulaId, entry};
use psy_solver::Outcome;
use serde::Serialize;

use crate::derived::{DerivedQuantities, derive_for_entry};
use crate::error::{AppError, AppResult};
use crate::session::{CalculationSession, ResultEntry, ResultValue, SolveMode};

/// Outcome counts over a session's rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub mode: SolveMode,
    pub row_count: usize,
    pub outcomes: BTreeMap<Outcome, usize>,
}

impl SessionSummary {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }
}

pub fn summarize(session: &CalculationSession) -> SessionSummary {
    let mut outcomes = BTreeMap::new();
    for result in session.results() {
        *outcomes.entry(result.outcome()).or_insert(0) += 1;
    }
    SessionSummary {
        mode: session.inputs().mode,
        row_count: session.len(),
        outcomes,
    }
}

/// Row by catalog position.
pub fn row(session: &CalculationSession, index: usize) -> AppResult<&ResultEntry> {
    session.results().get(index).ok_or(AppError::RowNotFound {
        index,
        len: session.len(),
    })
}

/// Row for a formula, by identifier string.
pub fn result_for<'a>(session: &'a CalculationSession, formula: &str) -> AppResult<&'a ResultEntry> {
    let id: FormulaId = formula.parse()?;
    session
        .results()
        .iter()
        .find(|r| r.formula == id)
        .ok_or_else(|| AppError::FormulaNotFound(formula.to_string()))
}

/// Successful rows only.
pub fn successful_rows(session: &CalculationSession) -> impl Iterator<Item = &ResultEntry> {
    session
        .results()
        .iter()
        .filter(|r| r.outcome().is_success())
}

fn numeric(value: Option<ResultValue>, index: usize, result: &ResultEntry) -> AppResult<f64> {
    let value = value.unwrap_or(ResultValue::Failure(Outcome::NotApplicable));
    value.temperature().ok_or_else(|| AppError::NoNumericResult {
        index,
        formula: result.formula.to_string(),
        outcome: value.outcome().to_string(),
    })
}

/// Derived quantities for one row, using the session's stored inputs.
pub fn derive_for_row(
    session: &CalculationSession,
    index: usize,
    gravity: f64,
) -> AppResult<DerivedQuantities> {
    let result = row(session, index)?;
    let inputs = session.inputs();
    let primary = numeric(Some(result.primary), index, result)?;
    let missing = || AppError::NoNumericResult {
        index,
        formula: result.formula.to_string(),
        outcome: "missing relative humidity".to_string(),
    };

    let (dew_point_c, wet_bulb_c, rh) = match inputs.mode {
        SolveMode::WetBulb => (
            inputs.dew_point_c.ok_or_else(missing)?,
            primary,
            result.relative_humidity.ok_or_else(missing)?,
        ),
        SolveMode::DewPoint => (
            primary,
            inputs.wet_bulb_c.ok_or_else(missing)?,
            result.relative_humidity.ok_or_else(missing)?,
        ),
        SolveMode::Both => (
            primary,
            numeric(result.secondary, index, result)?,
            inputs.relative_humidity.ok_or_else(missing)?,
        ),
    };

    derive_for_entry(
        entry(result.formula),
        inputs.dry_bulb_c,
        dew_point_c,
        wet_bulb_c,
        inputs.pressure_hpa,
        rh,
        gravity,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunOptions;
    use psy_core::units::constants::G0_MPS2;
    use psy_solver::SolverConfig;

    fn scenario_one() -> CalculationSession {
        CalculationSession::run_wet_bulb(
            10.0,
            20.0,
            10.0,
            1013.25,
            &RunOptions::new(SolverConfig::wet_bulb()),
        )
        .unwrap()
    }

    #[test]
    fn summary_counts_every_row() {
        let session = scenario_one();
        let summary = summarize(&session);
        assert_eq!(summary.row_count, 14);
        assert_eq!(summary.outcomes.values().sum::<usize>(), 14);
        assert_eq!(summary.mode, SolveMode::WetBulb);
        assert!(summary.count(Outcome::Success) >= 9);
    }

    #[test]
    fn lookup_by_name_and_index() {
        let session = scenario_one();
        let by_name = result_for(&session, "goff-water").unwrap();
        let by_index = row(&session, 0).unwrap();
        assert_eq!(by_name, by_index);
        assert!(matches!(row(&session, 99), Err(AppError::RowNotFound { .. })));
        assert!(matches!(result_for(&session, "nope"), Err(AppError::Model(_))));
    }

    #[test]
    fn drill_into_successful_row() {
        let session = scenario_one();
        let derived = derive_for_row(&session, 0, G0_MPS2).unwrap();
        assert_eq!(derived.formula, FormulaId::GoffWater);
        assert_eq!(derived.dew_point_c, 10.0);
        assert!((derived.wet_bulb_c - 14.2396).abs() < 1e-3);
        assert!((derived.relative_humidity - 0.525).abs() < 1e-3);
    }

    #[test]
    fn drill_into_failed_row() {
        let session = scenario_one();
        // magnus-ice is valid only up to 0 °C
        let index = FormulaId::MagnusIce as usize;
        assert!(matches!(
            derive_for_row(&session, index, G0_MPS2),
            Err(AppError::NoNumericResult { .. })
        ));
    }

    #[test]
    fn successful_rows_filter() {
        let session = scenario_one();
        assert!(successful_rows(&session).all(|r| r.relative_humidity.is_some()));
    }
}
