// In crates/engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] app_config::Error),

    #[error("Analysis unavailable: {0}")]
    Analysis(#[from] analytics::Error),

    #[error("Price sample rejected: {0}")]
    Series(#[from] core_types::Error),

    #[error("Execution error: {0}")]
    Execution(#[from] execution::Error),

    #[error("Balance gate error: {0}")]
    Gate(#[from] risk::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
