use crate::PsyError;

/// Floating point type used throughout system
pub type Real = f64;

/// Relative error of `actual` against a nonzero `expected`.
pub fn relative_error(actual: Real, expected: Real) -> Real {
    if expected == 0.0 {
        return actual.abs();
    }
    ((actual - expected) / expected).abs()
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, PsyError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PsyError::NonFinite { what, value: v })
    }
}

/// Finite and strictly positive.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, PsyError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(PsyError::OutOfRange { what, value: v })
    }
}

/// Division that yields zero instead of inf/NaN when the denominator is not positive.
///
/// Psychrometric denominators such as `P - e` lose physical meaning once they
/// reach zero, so callers get a neutral value rather than garbage.
#[inline]
pub fn guarded_div(numerator: Real, denominator: Real) -> Real {
    if denominator > 0.0 && denominator.is_finite() {
        numerator / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero_and_negative() {
        assert!(ensure_positive(1013.25, "pressure").is_ok());
        assert!(matches!(
            ensure_positive(0.0, "pressure"),
            Err(PsyError::OutOfRange { .. })
        ));
        assert!(matches!(
            ensure_positive(Real::INFINITY, "pressure"),
            Err(PsyError::NonFinite { .. })
        ));
    }

    #[test]
    fn guarded_div_falls_back_to_zero() {
        assert_eq!(guarded_div(1.0, 0.0), 0.0);
        assert_eq!(guarded_div(1.0, -2.0), 0.0);
        assert!((guarded_div(1.0, 4.0) - 0.25).abs() < 1e-15);
    }

    #[test]
    fn relative_error_handles_zero_reference() {
        assert_eq!(relative_error(0.5, 0.0), 0.5);
        assert!((relative_error(1.01, 1.0) - 0.01).abs() < 1e-12);
    }
}
