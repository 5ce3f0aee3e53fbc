//! psy-core: stable foundation for psychro.
//!
//! Contains:
//! - units (uom SI types, canonical °C/hPa conversions, physical constants)
//! - numeric (Real, finite/positive checks, guarded division)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{PsyError, PsyResult};
pub use numeric::*;
pub use units::*;
