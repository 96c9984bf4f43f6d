// In crates/analytics/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Insufficient data for analysis")]
    InsufficientData,

    #[error("Indicator error: {0}")]
    Indicator(String),
}

pub type Result<T> = std::result::Result<T, Error>;
