//! Initial-guess strategies for the wet-bulb solve.
//!
//! The strategy only decides where Newton starts. It also decides which
//! temperature the validity check sees, so a poor strategy can make a
//! formula report `NotApplicable` for an otherwise solvable query.

use psy_core::numeric::Real;

/// Magnus coefficients used for the dew-point estimate in RH mode.
const MAGNUS_B: Real = 17.62;
const MAGNUS_C: Real = 243.12;

/// How the starting wet-bulb temperature is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum InitialGuessStrategy {
    /// Start at the dew point (known, or estimated from relative humidity).
    #[default]
    DewPoint,
    /// Start a fixed offset below the dry bulb: 2 °C below freezing, 5 °C above.
    DryBulbOffset,
}

impl InitialGuessStrategy {
    /// Convert strategy to human-readable name for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            InitialGuessStrategy::DewPoint => "dew-point",
            InitialGuessStrategy::DryBulbOffset => "dry-bulb-offset",
        }
    }

    /// Starting temperature [°C] given the dry bulb and the (estimated) dew point.
    pub fn initial_guess(&self, dry_bulb_c: Real, dew_point_c: Real) -> Real {
        match self {
            InitialGuessStrategy::DewPoint => dew_point_c,
            InitialGuessStrategy::DryBulbOffset => {
                if dry_bulb_c < 0.0 {
                    dry_bulb_c - 2.0
                } else {
                    dry_bulb_c - 5.0
                }
            }
        }
    }

    /// Starting temperature [°C] when relative humidity (fraction) is the known value.
    ///
    /// `None` when no dew point exists (RH not positive).
    pub fn initial_guess_from_rh(&self, dry_bulb_c: Real, rh: Real) -> Option<Real> {
        match self {
            InitialGuessStrategy::DewPoint => magnus_dew_point(dry_bulb_c, rh),
            InitialGuessStrategy::DryBulbOffset => Some(self.initial_guess(dry_bulb_c, dry_bulb_c)),
        }
    }
}

/// Magnus approximation of the dew point [°C] for a relative humidity fraction.
pub fn magnus_dew_point(dry_bulb_c: Real, rh: Real) -> Option<Real> {
    if !(rh > 0.0 && rh.is_finite()) {
        return None;
    }
    let gamma = rh.ln() + MAGNUS_B * dry_bulb_c / (MAGNUS_C + dry_bulb_c);
    let denom = MAGNUS_B - gamma;
    if denom == 0.0 {
        return None;
    }
    let td = MAGNUS_C * gamma / denom;
    td.is_finite().then_some(td)
}
