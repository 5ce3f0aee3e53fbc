//! Shared application service layer for psychro.
//!
//! This crate provides the entry points consumed by front ends: the three
//! session run modes over the full formula catalog, derived quantities for
//! a chosen row, drill-down queries and run configuration loading.

pub mod config;
pub mod derived;
pub mod error;
pub mod query;
pub mod session;

// Re-export key types for convenience
pub use config::{ExecutionMode, RunConfig, RunOptions, load_run_config, parse_run_config};
pub use derived::{DerivedQuantities, derive_quantities};
pub use error::{AppError, AppResult};
pub use query::{SessionSummary, derive_for_row, result_for, row, successful_rows, summarize};
pub use session::{CalculationSession, ResultEntry, ResultValue, SessionInputs, SolveMode};
