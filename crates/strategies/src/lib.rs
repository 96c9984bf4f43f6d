// In crates/strategies/src/lib.rs

pub mod ma_crossover;
pub mod moving_average;
pub mod types;

pub use ma_crossover::{Crossovers, MACrossover, crossover_at, detect_crossovers, latest_crossover};
pub use moving_average::{MovingAverages, moving_average};
pub use types::{MACrossoverSettings, MaKind};
