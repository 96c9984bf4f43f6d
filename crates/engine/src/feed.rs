// In crates/engine/src/feed.rs

use app_config::SimulationSettings;
use chrono::{DateTime, Duration, Utc};
use core_types::PricePoint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Synthetic price source standing in for a market data connection.
#[derive(Debug)]
pub struct SyntheticFeed {
    settings: SimulationSettings,
    rng: StdRng,
}

impl SyntheticFeed {
    pub fn new(settings: SimulationSettings, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { settings, rng }
    }

    /// `count` samples spaced by `step`, the last one stamped `end`.
    ///
    /// The shape is a random base level with a slow sine wave, uniform noise
    /// and a small upward drift.
    pub fn history(&mut self, count: usize, end: DateTime<Utc>, step: Duration) -> Vec<PricePoint> {
        let base = self.base_price();
        (0..count)
            .map(|i| {
                let trend = (i as f64 * 0.05).sin() * 5.0;
                let noise = self.rng.gen_range(-1.0..1.0);
                let drift = i as f64 * 0.1;
                let back = i32::try_from(count - 1 - i).unwrap_or(i32::MAX);
                PricePoint {
                    timestamp: end - step * back,
                    price: self.floor(base + trend + noise + drift),
                }
            })
            .collect()
    }

    /// The next live price: a bounded random step from `previous`.
    pub fn next_price(&mut self, previous: Option<f64>) -> f64 {
        let Some(previous) = previous else {
            return self.base_price();
        };
        let volatility = self.settings.tick_volatility;
        let change = self.rng.gen_range(-volatility..volatility);
        self.floor(previous + change)
    }

    fn base_price(&mut self) -> f64 {
        self.rng
            .gen_range(self.settings.base_price_min..self.settings.base_price_max)
    }

    fn floor(&self, price: f64) -> f64 {
        price.max(self.settings.min_price)
    }
}
