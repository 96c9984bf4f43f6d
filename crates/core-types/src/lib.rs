// In crates/core-types/src/lib.rs

pub mod error;
pub mod series;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use error::{Error, Result};
pub use series::PriceSeries;
pub use types::{
    CrossoverEvent, Position, PricePoint, Side, Symbol, Trade, TradeId, TradeOrigin,
};
