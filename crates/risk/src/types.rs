// In crates/risk/src/types.rs

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Outcome of a single balance check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalanceCheck {
    pub approved: bool,
    pub available: Decimal,
}

impl BalanceCheck {
    pub fn evaluate(required: Decimal, available: Decimal) -> Self {
        Self {
            approved: available >= required,
            available,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceGateSettings {
    /// Lower bound of the simulated available balance (quote currency).
    #[serde(default = "default_min_available")]
    pub min_available: Decimal,
    /// Upper bound (exclusive) of the simulated available balance.
    #[serde(default = "default_max_available")]
    pub max_available: Decimal,
    /// Probability in [0, 1] that a check fails with a transient error.
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
    /// Simulated round-trip latency range in milliseconds.
    #[serde(default = "default_min_latency_ms")]
    pub min_latency_ms: u64,
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: u64,
}

impl Default for BalanceGateSettings {
    fn default() -> Self {
        Self {
            min_available: default_min_available(),
            max_available: default_max_available(),
            failure_rate: default_failure_rate(),
            min_latency_ms: default_min_latency_ms(),
            max_latency_ms: default_max_latency_ms(),
        }
    }
}

fn default_min_available() -> Decimal { dec!(0) }
fn default_max_available() -> Decimal { dec!(1000) }
fn default_failure_rate() -> f64 { 0.05 }
fn default_min_latency_ms() -> u64 { 100 }
fn default_max_latency_ms() -> u64 { 500 }
