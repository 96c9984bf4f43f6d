// In crates/analytics/src/lib.rs

pub mod chart;
pub mod error;
pub mod ledger;
pub mod stats;
pub mod types;

pub use chart::analyze;
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use stats::compute_stats;
pub use types::{AnalysisSnapshot, Bias, Stats, Trend};
