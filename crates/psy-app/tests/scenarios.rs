//! End-to-end checks of the three run modes over the full catalog.

use psy_app::{CalculationSession, ResultValue, RunOptions, result_for};
use psy_models::{FormulaId, Surface, entry, formula_catalog};
use psy_solver::{Outcome, SolverConfig};

fn wet_bulb_options() -> RunOptions {
    RunOptions::new(SolverConfig::wet_bulb())
}

fn dew_point_options() -> RunOptions {
    RunOptions::new(SolverConfig::dew_point())
}

#[test]
fn goff_water_at_twenty_degrees() {
    let session =
        CalculationSession::run_wet_bulb(10.0, 20.0, 10.0, 1013.25, &wet_bulb_options()).unwrap();
    let goff = result_for(&session, "goff-water").unwrap();

    assert_eq!(goff.outcome(), Outcome::Success);
    let tw = goff.primary.temperature().unwrap();
    assert!((tw - 14.24).abs() < 0.1, "tw = {tw}");
    let rh = goff.relative_humidity.unwrap();
    assert!((rh - 0.52).abs() < 0.01, "rh = {rh}");

    let history = session.iterations_for(FormulaId::GoffWater);
    assert!(!history.is_empty());
    assert!(history.windows(2).all(|w| w[0].index < w[1].index));
}

#[test]
fn cold_air_uses_only_ice_formulas() {
    let session =
        CalculationSession::run_wet_bulb(-25.0, -20.0, -25.0, 1013.25, &wet_bulb_options())
            .unwrap();
    for (result, formula) in session.results().iter().zip(formula_catalog()) {
        if formula.surface == Surface::Water {
            assert_eq!(result.outcome(), Outcome::NotApplicable, "{}", formula.name());
        } else {
            assert_ne!(result.outcome(), Outcome::NotApplicable, "{}", formula.name());
        }
    }
}

#[test]
fn saturated_air_has_dew_point_equal_to_dry_bulb() {
    let session =
        CalculationSession::run_dew_point(15.0, 15.0, 1013.25, &dew_point_options()).unwrap();
    assert!(session.iterations().is_empty());
    for (result, formula) in session.results().iter().zip(formula_catalog()) {
        if !formula.is_valid_at(15.0) {
            assert_eq!(result.outcome(), Outcome::NotApplicable, "{}", formula.name());
            continue;
        }
        assert_eq!(result.primary, ResultValue::Temperature(15.0), "{}", formula.name());
        assert_eq!(result.relative_humidity, Some(1.0));
    }
}

#[test]
fn negative_vapour_pressure_is_physically_invalid() {
    // Wet-bulb depression of 40 K drives e = esat(0) - γ·40 below zero.
    let session =
        CalculationSession::run_dew_point(40.0, 0.0, 1013.25, &dew_point_options()).unwrap();
    assert_eq!(session.len(), formula_catalog().len());
    for (result, formula) in session.results().iter().zip(formula_catalog()) {
        if formula.is_valid_at(0.0) || formula.is_valid_at(40.0) {
            assert_eq!(result.outcome(), Outcome::PhysicallyInvalid, "{}", formula.name());
            assert_eq!(result.relative_humidity, None);
        } else {
            assert_eq!(result.outcome(), Outcome::NotApplicable, "{}", formula.name());
        }
    }
}

#[test]
fn dew_point_recovers_known_value() {
    let session =
        CalculationSession::run_dew_point(20.0, 14.2396, 1013.25, &dew_point_options()).unwrap();
    let goff = result_for(&session, "goff-water").unwrap();
    let td = goff.primary.temperature().unwrap();
    assert!((td - 10.0).abs() < 1e-3, "td = {td}");
}

#[test]
fn dual_mode_matches_single_modes() {
    let wet =
        CalculationSession::run_wet_bulb(10.0, 20.0, 10.0, 1013.25, &wet_bulb_options()).unwrap();
    let rh = result_for(&wet, "wexler-water")
        .unwrap()
        .relative_humidity
        .unwrap();

    let both = CalculationSession::run_both(10.0, 20.0, rh * 100.0, 1013.25, &wet_bulb_options())
        .unwrap();
    let wexler = result_for(&both, "wexler-water").unwrap();
    let td = wexler.primary.temperature().unwrap();
    let tw = wexler.secondary.unwrap().temperature().unwrap();
    let expected_tw = result_for(&wet, "wexler-water")
        .unwrap()
        .primary
        .temperature()
        .unwrap();
    assert!((td - 10.0).abs() < 1e-4, "td = {td}");
    assert!((tw - expected_tw).abs() < 1e-4, "tw = {tw}");
}

#[test]
fn dual_mode_checks_dry_bulb_validity() {
    // 5 °C is outside every ice formula's range except goff-ice and wexler-ice
    let session =
        CalculationSession::run_both(0.0, 5.0, 80.0, 1013.25, &wet_bulb_options()).unwrap();
    for (result, formula) in session.results().iter().zip(formula_catalog()) {
        let expected_na = !formula.is_valid_at(5.0);
        assert_eq!(
            result.outcome() == Outcome::NotApplicable,
            expected_na,
            "{}",
            formula.name()
        );
    }
    assert_eq!(
        session.results()[FormulaId::MartiIce as usize].outcome(),
        Outcome::NotApplicable
    );
    assert!(entry(FormulaId::GoffIce).is_valid_at(5.0));
}

#[test]
fn one_bad_formula_does_not_abort_the_session() {
    // Starting at 199 °C only wexler-water applies, and it diverges.
    let session =
        CalculationSession::run_wet_bulb(199.0, 200.0, 150.0, 1013.25, &wet_bulb_options())
            .unwrap();
    assert_eq!(session.len(), formula_catalog().len());
    let wexler = result_for(&session, "wexler-water").unwrap();
    assert_eq!(wexler.outcome(), Outcome::ResidualTooLarge);
    assert!(
        session
            .results()
            .iter()
            .filter(|r| r.formula != FormulaId::WexlerWater)
            .all(|r| r.outcome() == Outcome::NotApplicable)
    );
}

#[test]
fn dew_point_not_below_dry_bulb_is_rejected() {
    for dew_point in [20.0, 25.0] {
        let err = CalculationSession::run_wet_bulb(10.0, 20.0, dew_point, 1013.25, &wet_bulb_options())
            .unwrap_err();
        assert!(matches!(err, psy_app::AppError::InvalidInput(_)));
    }
}

#[test]
fn parallel_run_matches_sequential() {
    let sequential = wet_bulb_options();
    let parallel = sequential.parallel();

    let a = CalculationSession::run_wet_bulb(10.0, 20.0, 10.0, 1013.25, &sequential).unwrap();
    let b = CalculationSession::run_wet_bulb(10.0, 20.0, 10.0, 1013.25, &parallel).unwrap();
    assert_eq!(a, b);

    let a = CalculationSession::run_dew_point(20.0, 14.0, 1013.25, &dew_point_options()).unwrap();
    let b = CalculationSession::run_dew_point(20.0, 14.0, 1013.25, &dew_point_options().parallel())
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn session_serializes_to_json() {
    let session =
        CalculationSession::run_wet_bulb(10.0, 20.0, 10.0, 1013.25, &wet_bulb_options()).unwrap();
    let json = serde_json::to_value(&session).unwrap();
    assert_eq!(json["results"].as_array().unwrap().len(), 14);
    assert_eq!(json["results"][0]["formula"], "goff-water");
    assert_eq!(json["results"][0]["primary"]["kind"], "temperature");
    assert!(json["iterations"]["goff-water"].is_array());
}
