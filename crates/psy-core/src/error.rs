use thiserror::Error;

pub type PsyResult<T> = Result<T, PsyError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PsyError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Value out of range for {what}: {value}")]
    OutOfRange { what: &'static str, value: f64 },

    #[error("Unknown unit '{unit}' for {quantity}")]
    UnknownUnit {
        unit: String,
        quantity: &'static str,
    },
}
