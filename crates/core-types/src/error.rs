// In crates/core-types/src/error.rs

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Sample at {next} is not after the latest sample at {last}")]
    NonMonotonicTimestamp {
        last: DateTime<Utc>,
        next: DateTime<Utc>,
    },

    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

pub type Result<T> = std::result::Result<T, Error>;
