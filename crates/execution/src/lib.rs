// In crates/execution/src/lib.rs

pub mod error;
pub mod paper;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use paper::PaperPositionManager;
pub use types::PositionState;
