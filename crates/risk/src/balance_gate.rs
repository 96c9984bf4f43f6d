// In crates/risk/src/balance_gate.rs

use crate::types::{BalanceCheck, BalanceGateSettings};
use crate::{BalanceGate, Error, Result};
use async_trait::async_trait;
use core_types::Symbol;
use num_traits::{FromPrimitive, ToPrimitive};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::sync::Mutex;

/// A balance provider that draws a pseudo-random available balance on every
/// call, after a simulated network delay.
///
/// Stands in for an exchange account query during paper trading.
#[derive(Debug)]
pub struct SimulatedBalanceGate {
    settings: BalanceGateSettings,
    rng: Mutex<StdRng>,
}

impl SimulatedBalanceGate {
    pub fn new(settings: BalanceGateSettings, seed: Option<u64>) -> Result<Self> {
        if settings.max_available < settings.min_available {
            return Err(Error::InvalidParameters(format!(
                "max_available ({}) is below min_available ({})",
                settings.max_available, settings.min_available
            )));
        }
        if !(0.0..=1.0).contains(&settings.failure_rate) {
            return Err(Error::InvalidParameters(format!(
                "failure_rate ({}) must be within [0, 1]",
                settings.failure_rate
            )));
        }
        if settings.max_latency_ms < settings.min_latency_ms {
            return Err(Error::InvalidParameters(
                "max_latency_ms is below min_latency_ms".to_string(),
            ));
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            settings,
            rng: Mutex::new(rng),
        })
    }

    /// Draws (latency, failed, available) for one call.
    async fn draw(&self) -> (Duration, bool, Decimal) {
        let mut rng = self.rng.lock().await;
        let latency = rng.gen_range(self.settings.min_latency_ms..=self.settings.max_latency_ms);
        let failed = rng.gen_bool(self.settings.failure_rate);

        let min = self.settings.min_available.to_f64().unwrap_or(0.0);
        let max = self.settings.max_available.to_f64().unwrap_or(min);
        let available = if max > min { rng.gen_range(min..max) } else { min };
        let available = Decimal::from_f64(available).unwrap_or_default().round_dp(2);

        (Duration::from_millis(latency), failed, available)
    }
}

#[async_trait]
impl BalanceGate for SimulatedBalanceGate {
    fn name(&self) -> &'static str {
        "SimulatedBalanceGate"
    }

    async fn check_balance(&self, symbol: &Symbol, required: Decimal) -> Result<BalanceCheck> {
        let (latency, failed, available) = self.draw().await;

        // --- Model the round trip to the account service ---
        tokio::time::sleep(latency).await;

        if failed {
            tracing::debug!(%symbol, latency_ms = latency.as_millis() as u64, "Simulated balance check failed.");
            return Err(Error::Unavailable(format!(
                "balance service timed out for {}",
                symbol
            )));
        }

        let check = BalanceCheck::evaluate(required, available);
        tracing::debug!(%symbol, %required, %available, approved = check.approved, "Balance checked.");
        Ok(check)
    }
}

/// A balance provider reporting a fixed available amount, without latency.
#[derive(Debug, Clone)]
pub struct StaticBalanceGate {
    available: Decimal,
}

impl StaticBalanceGate {
    pub fn new(available: Decimal) -> Self {
        Self { available }
    }
}

#[async_trait]
impl BalanceGate for StaticBalanceGate {
    fn name(&self) -> &'static str {
        "StaticBalanceGate"
    }

    async fn check_balance(&self, _symbol: &Symbol, required: Decimal) -> Result<BalanceCheck> {
        Ok(BalanceCheck::evaluate(required, self.available))
    }
}
