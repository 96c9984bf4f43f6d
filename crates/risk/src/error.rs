// In crates/risk/src/error.rs

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Insufficient balance: {required} required, {available} available")]
    InsufficientBalance { required: Decimal, available: Decimal },

    #[error("Balance check unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid balance gate parameters: {0}")]
    InvalidParameters(String),
}

pub type Result<T> = std::result::Result<T, Error>;
