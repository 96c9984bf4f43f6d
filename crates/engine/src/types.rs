// In crates/engine/src/types.rs

use chrono::{DateTime, Utc};
use core_types::{CrossoverEvent, PricePoint, Side, Trade};
use serde::Serialize;
use strategies::Crossovers;

/// What a single ingested price led to.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No crossover on the newest sample.
    Quiet,
    Entered(Trade),
    Exited(Trade),
    /// A signal or request was turned down; carries the logged reason.
    Rejected(String),
    /// A balance approval arrived after the run was stopped and was dropped.
    Discarded,
}

/// Buy and sell markers for charting, restricted to the visible window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartMarkers {
    pub buys: Vec<PricePoint>,
    pub sells: Vec<PricePoint>,
}

impl ChartMarkers {
    pub fn from_scan(found: &Crossovers) -> Self {
        let to_point = |e: &CrossoverEvent| PricePoint { timestamp: e.timestamp, price: e.price };
        Self {
            buys: found.buys.iter().map(to_point).collect(),
            sells: found.sells.iter().map(to_point).collect(),
        }
    }

    pub fn record(&mut self, event: &CrossoverEvent) {
        let point = PricePoint { timestamp: event.timestamp, price: event.price };
        match event.side {
            Side::Buy => self.buys.push(point),
            Side::Sell => self.sells.push(point),
        }
    }

    /// Drops markers older than the oldest sample still in the window.
    pub fn prune(&mut self, oldest: DateTime<Utc>) {
        self.buys.retain(|p| p.timestamp >= oldest);
        self.sells.retain(|p| p.timestamp >= oldest);
    }
}

/// Everything a chart needs: the window, both averages and the markers.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub points: Vec<PricePoint>,
    pub short_label: String,
    pub long_label: String,
    pub short: Vec<Option<f64>>,
    pub long: Vec<Option<f64>>,
    pub markers: ChartMarkers,
}
