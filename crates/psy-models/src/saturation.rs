//! Saturation vapour pressure formula families.
//!
//! Every empirical formula in the catalog belongs to one of a handful of
//! families. A family carries its own coefficient set and knows how to
//! evaluate `esat(T)` and, where a closed form exists, `d esat / dT`.
//! Families without an analytic derivative fall back to a central
//! finite difference.
//!
//! All inputs are in °C, all outputs in hPa (or hPa/°C for derivatives).

use psy_core::units::{celsius_to_kelvin, constants::KELVIN_OFFSET};

use crate::error::{ModelError, ModelResult};

/// Default step for the central-difference derivative fallback [°C].
pub const DERIVATIVE_STEP_C: f64 = 0.001;

/// Per-family evaluation seam.
///
/// `esat_raw` may return non-finite values; [`SaturationModel`] classifies
/// them into overflow or domain errors so every family is treated alike.
pub trait SaturationCurve {
    /// Saturation vapour pressure [hPa] at `t_c` [°C].
    fn esat_raw(&self, t_c: f64) -> f64;

    /// Analytic derivative [hPa/°C], or `None` when the family has no closed form.
    fn desat_raw(&self, _t_c: f64) -> Option<f64> {
        None
    }

    /// Whether the family works on absolute temperature (and so rejects T <= 0 K).
    fn uses_absolute_temperature(&self) -> bool {
        true
    }
}

/// Magnus-type exponential: `esat = A·exp(B·T/(C+T))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl SaturationCurve for ExponentialCoefficients {
    fn esat_raw(&self, t_c: f64) -> f64 {
        self.a * (self.b * t_c / (self.c + t_c)).exp()
    }

    fn desat_raw(&self, t_c: f64) -> Option<f64> {
        let denom = self.c + t_c;
        Some(self.esat_raw(t_c) * self.b * self.c / (denom * denom))
    }

    fn uses_absolute_temperature(&self) -> bool {
        false
    }
}

impl ExponentialCoefficients {
    /// Algebraic inverse of `A·exp(B·T/(C+T)) = e`.
    pub fn invert(&self, e_hpa: f64) -> ModelResult<f64> {
        if e_hpa.is_nan() || e_hpa <= 0.0 {
            return Err(ModelError::Domain {
                what: "log of non-positive vapour pressure",
            });
        }
        let ln_ratio = (e_hpa / self.a).ln();
        let denom = self.b - ln_ratio;
        if denom == 0.0 {
            return Err(ModelError::DivisionByZero {
                what: "closed-form esat inversion",
            });
        }
        ModelError::check(self.c * ln_ratio / denom, "closed-form esat inversion")
    }
}

/// Goff-Gratch log10 form, normalised to a reference absolute temperature.
///
/// ```text
/// log10 e = b(1 - r/Tk) + c·log10(Tk/r) + d(1 - 10^(f1(Tk/r - 1)))
///         + f(10^(f2(1 - r/Tk)) - 1) + i(1 - Tk/r) + h
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoffGratchCoefficients {
    /// Reference temperature [K]
    pub reference_k: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub d_exp: f64,
    pub f: f64,
    pub f_exp: f64,
    /// log10 of the reference pressure [hPa]
    pub h: f64,
    pub i: f64,
}

impl SaturationCurve for GoffGratchCoefficients {
    fn esat_raw(&self, t_c: f64) -> f64 {
        let tk = celsius_to_kelvin(t_c);
        let r = self.reference_k;
        let log10_e = self.b * (1.0 - r / tk)
            + self.c * (tk / r).log10()
            + self.d * (1.0 - 10f64.powf(self.d_exp * (tk / r - 1.0)))
            + self.f * (10f64.powf(self.f_exp * (1.0 - r / tk)) - 1.0)
            + self.i * (1.0 - tk / r)
            + self.h;
        10f64.powf(log10_e)
    }

    fn desat_raw(&self, t_c: f64) -> Option<f64> {
        let tk = celsius_to_kelvin(t_c);
        let r = self.reference_k;
        let ln10 = std::f64::consts::LN_10;
        let dlog10 = self.b * r / (tk * tk)
            + self.c / (tk * ln10)
            - self.d * self.d_exp / r * ln10 * 10f64.powf(self.d_exp * (tk / r - 1.0))
            + self.f * self.f_exp * r / (tk * tk)
                * ln10
                * 10f64.powf(self.f_exp * (1.0 - r / tk))
            - self.i / r;
        Some(self.esat_raw(t_c) * ln10 * dlog10)
    }
}

/// Wexler natural-log polynomial, producing Pa before scaling to hPa.
///
/// ```text
/// ln e_Pa = g0/Tk + g1 + g2·Tk + g3·Tk² + g4·Tk³ + g5·Tk⁴ + g6·ln Tk
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WexlerCoefficients {
    pub g: [f64; 7],
}

impl SaturationCurve for WexlerCoefficients {
    fn esat_raw(&self, t_c: f64) -> f64 {
        let tk = celsius_to_kelvin(t_c);
        let g = &self.g;
        let ln_e = g[0] / tk
            + g[1]
            + g[2] * tk
            + g[3] * tk.powi(2)
            + g[4] * tk.powi(3)
            + g[5] * tk.powi(4)
            + g[6] * tk.ln();
        ln_e.exp() / 100.0
    }

    fn desat_raw(&self, t_c: f64) -> Option<f64> {
        let tk = celsius_to_kelvin(t_c);
        let g = &self.g;
        let dln = -g[0] / (tk * tk)
            + g[2]
            + 2.0 * g[3] * tk
            + 3.0 * g[4] * tk.powi(2)
            + 4.0 * g[5] * tk.powi(3)
            + g[6] / tk;
        Some(self.esat_raw(t_c) * dln)
    }
}

/// Gili water-surface formula, a log10 form around the steam point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GiliCoefficients;

impl GiliCoefficients {
    const STEAM_POINT_K: f64 = 373.16;
}

impl SaturationCurve for GiliCoefficients {
    fn esat_raw(&self, t_c: f64) -> f64 {
        let tk = celsius_to_kelvin(t_c);
        let ts = Self::STEAM_POINT_K;
        let exponent = 0.001_419_66 - 3.142_305 * (1e3 / tk - 1e3 / ts)
            + 8.2 * (ts / tk).log10()
            - 0.002_480_4 * (ts - tk);
        980.66 * 10f64.powf(exponent)
    }
}

/// Marti-Mauersberger ice formula: `log10 e_Pa = a/Tk + b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MartiCoefficients {
    pub a: f64,
    pub b: f64,
}

impl SaturationCurve for MartiCoefficients {
    fn esat_raw(&self, t_c: f64) -> f64 {
        let tk = celsius_to_kelvin(t_c);
        10f64.powf(self.a / tk + self.b) / 100.0
    }

    fn desat_raw(&self, t_c: f64) -> Option<f64> {
        let tk = celsius_to_kelvin(t_c);
        Some(self.esat_raw(t_c) * std::f64::consts::LN_10 * -self.a / (tk * tk))
    }
}

/// Tagged formula family, resolved once at catalog construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SaturationModel {
    Exponential(ExponentialCoefficients),
    GoffGratch(GoffGratchCoefficients),
    Wexler(WexlerCoefficients),
    Gili(GiliCoefficients),
    Marti(MartiCoefficients),
}

impl SaturationModel {
    fn curve(&self) -> &dyn SaturationCurve {
        match self {
            Self::Exponential(c) => c,
            Self::GoffGratch(c) => c,
            Self::Wexler(c) => c,
            Self::Gili(c) => c,
            Self::Marti(c) => c,
        }
    }

    pub fn family(&self) -> &'static str {
        match self {
            Self::Exponential(_) => "exponential",
            Self::GoffGratch(_) => "goff-gratch",
            Self::Wexler(_) => "wexler",
            Self::Gili(_) => "gili",
            Self::Marti(_) => "marti",
        }
    }

    fn check_temperature(&self, t_c: f64) -> ModelResult<()> {
        if !t_c.is_finite() {
            return Err(ModelError::InvalidArg {
                what: "temperature must be finite",
            });
        }
        if self.curve().uses_absolute_temperature() && t_c <= -KELVIN_OFFSET {
            return Err(ModelError::Domain {
                what: "absolute temperature must be positive",
            });
        }
        Ok(())
    }

    /// Saturation vapour pressure [hPa] at `t_c` [°C].
    pub fn esat(&self, t_c: f64) -> ModelResult<f64> {
        self.check_temperature(t_c)?;
        ModelError::check(self.curve().esat_raw(t_c), "saturation vapour pressure")
    }

    /// Temperature derivative of [`Self::esat`] [hPa/°C].
    pub fn desat_dt(&self, t_c: f64) -> ModelResult<f64> {
        self.check_temperature(t_c)?;
        match self.curve().desat_raw(t_c) {
            Some(d) => ModelError::check(d, "saturation vapour pressure derivative"),
            None => self.central_difference(t_c, DERIVATIVE_STEP_C),
        }
    }

    /// Central finite difference of `esat` with step `h` [°C].
    pub fn central_difference(&self, t_c: f64, h: f64) -> ModelResult<f64> {
        let upper = self.esat(t_c + h)?;
        let lower = self.esat(t_c - h)?;
        ModelError::check((upper - lower) / (2.0 * h), "finite-difference derivative")
    }

    /// Coefficients for closed-form inversion, when the family admits one.
    pub fn closed_form(&self) -> Option<&ExponentialCoefficients> {
        match self {
            Self::Exponential(c) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAGNUS: ExponentialCoefficients = ExponentialCoefficients {
        a: 6.112,
        b: 17.62,
        c: 243.12,
    };

    #[test]
    fn exponential_is_anchored_at_zero() {
        let model = SaturationModel::Exponential(MAGNUS);
        assert_eq!(model.esat(0.0).unwrap(), 6.112);
    }

    #[test]
    fn exponential_at_twenty_degrees() {
        let model = SaturationModel::Exponential(MAGNUS);
        let e = model.esat(20.0).unwrap();
        assert!((e - 23.326).abs() < 1e-3, "e = {e}");
    }

    #[test]
    fn analytic_derivative_matches_central_difference() {
        let model = SaturationModel::Exponential(MAGNUS);
        for t in [-20.0, 0.0, 15.0, 40.0] {
            let analytic = model.desat_dt(t).unwrap();
            let numeric = model.central_difference(t, DERIVATIVE_STEP_C).unwrap();
            assert!((analytic - numeric).abs() < 1e-6, "t = {t}");
        }
    }

    #[test]
    fn exponential_overflow_is_reported() {
        // Just past the pole at T = -C the exponent turns large and positive.
        let model = SaturationModel::Exponential(MAGNUS);
        assert!(matches!(
            model.esat(-243.2),
            Err(ModelError::Overflow { .. })
        ));
    }

    #[test]
    fn absolute_families_reject_sub_zero_kelvin() {
        let model = SaturationModel::Marti(MartiCoefficients {
            a: -2663.5,
            b: 12.537,
        });
        assert!(matches!(model.esat(-300.0), Err(ModelError::Domain { .. })));
    }

    #[test]
    fn non_finite_temperature_is_invalid() {
        let model = SaturationModel::Gili(GiliCoefficients);
        assert!(matches!(
            model.esat(f64::NAN),
            Err(ModelError::InvalidArg { .. })
        ));
    }

    #[test]
    fn closed_form_inverse_round_trips() {
        let e = MAGNUS.esat_raw(12.5);
        let t = MAGNUS.invert(e).unwrap();
        assert!((t - 12.5).abs() < 1e-9);
    }

    #[test]
    fn closed_form_inverse_rejects_non_positive_target() {
        assert!(matches!(MAGNUS.invert(0.0), Err(ModelError::Domain { .. })));
        assert!(matches!(MAGNUS.invert(-1.0), Err(ModelError::Domain { .. })));
    }

    #[test]
    fn closed_form_inverse_detects_vanishing_denominator() {
        // ln(e/A) == B exactly when e = A·exp(B)
        let coeffs = ExponentialCoefficients {
            a: 1.0,
            b: 0.0,
            c: 243.12,
        };
        assert!(matches!(
            coeffs.invert(1.0),
            Err(ModelError::DivisionByZero { .. })
        ));
    }
}
