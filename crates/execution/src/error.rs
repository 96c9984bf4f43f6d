// In crates/execution/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("A position is already open")]
    AlreadyInPosition,

    #[error("No open position")]
    NoOpenPosition,

    #[error("Execution failed: {0}")]
    ExecutionFailed(#[from] core_types::Error),
}

impl Error {
    /// Rejections are expected outcomes of the state machine, not faults.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::AlreadyInPosition | Error::NoOpenPosition)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
