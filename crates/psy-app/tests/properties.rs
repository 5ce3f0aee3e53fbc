//! Property tests across the session layer.

use proptest::prelude::*;
use psy_app::{CalculationSession, RunOptions};
use psy_solver::{Outcome, SolverConfig};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn wet_bulb_then_dew_point_round_trips(
        dry_bulb in 2.0..35.0f64,
        depression in 1.0..10.0f64,
    ) {
        let dew_point = dry_bulb - depression;
        let wet = CalculationSession::run_wet_bulb(
            dew_point,
            dry_bulb,
            dew_point,
            1013.25,
            &RunOptions::new(SolverConfig::wet_bulb()),
        ).unwrap();

        for row in wet.results() {
            let Some(tw) = row.primary.temperature() else { continue };
            let dew = CalculationSession::run_dew_point(
                dry_bulb,
                tw,
                1013.25,
                &RunOptions::new(SolverConfig::dew_point()),
            ).unwrap();
            let back = &dew.results()[row.formula as usize];
            if back.outcome() != Outcome::Success {
                continue;
            }
            let td = back.primary.temperature().unwrap();
            prop_assert!(
                (td - dew_point).abs() < 1e-4,
                "{}: {} -> {} -> {}", row.formula, dew_point, tw, td
            );
        }
    }

    #[test]
    fn wet_bulb_runs_are_idempotent(
        dry_bulb in -30.0..40.0f64,
        depression in 0.5..12.0f64,
    ) {
        let dew_point = dry_bulb - depression;
        let options = RunOptions::new(SolverConfig::wet_bulb());
        let first = CalculationSession::run_wet_bulb(dew_point, dry_bulb, dew_point, 1013.25, &options).unwrap();
        let second = CalculationSession::run_wet_bulb(dew_point, dry_bulb, dew_point, 1013.25, &options).unwrap();
        prop_assert_eq!(first.results(), second.results());
    }

    #[test]
    fn successful_rows_have_physical_humidity(
        dry_bulb in -30.0..40.0f64,
        depression in 0.5..12.0f64,
    ) {
        let dew_point = dry_bulb - depression;
        let session = CalculationSession::run_wet_bulb(
            dew_point,
            dry_bulb,
            dew_point,
            1013.25,
            &RunOptions::new(SolverConfig::wet_bulb()),
        ).unwrap();
        prop_assert_eq!(session.len(), 14);
        for row in session.results() {
            if row.outcome() == Outcome::Success {
                let rh = row.relative_humidity.unwrap();
                prop_assert!((0.0..=1.0).contains(&rh));
            } else {
                prop_assert_eq!(row.relative_humidity, None);
            }
        }
    }
}
