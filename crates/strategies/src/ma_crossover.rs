// In crates/strategies/src/ma_crossover.rs

use crate::moving_average::MovingAverages;
use crate::types::MACrossoverSettings;
use core_types::{CrossoverEvent, PriceSeries, Side};

/// Buy and sell crossovers found by a scan, each in chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Crossovers {
    pub buys: Vec<CrossoverEvent>,
    pub sells: Vec<CrossoverEvent>,
}

impl Crossovers {
    /// Both lists merged into a single chronological stream.
    pub fn chronological(&self) -> Vec<CrossoverEvent> {
        let mut events: Vec<CrossoverEvent> =
            self.buys.iter().chain(self.sells.iter()).copied().collect();
        events.sort_by_key(|e| e.index);
        events
    }

    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }
}

/// Checks the index pair `(index - 1, index)` for a crossover.
///
/// Landing exactly on a tie is never a crossing; the tie counts as the
/// "not yet crossed" side for the following index.
pub fn crossover_at(
    series: &PriceSeries,
    short: &[Option<f64>],
    long: &[Option<f64>],
    index: usize,
) -> Option<CrossoverEvent> {
    if index == 0 {
        return None;
    }
    let prev_short = (*short.get(index - 1)?)?;
    let prev_long = (*long.get(index - 1)?)?;
    let curr_short = (*short.get(index)?)?;
    let curr_long = (*long.get(index)?)?;
    let point = series.get(index)?;

    let side = if prev_short <= prev_long && curr_short > curr_long {
        Side::Buy
    } else if prev_short >= prev_long && curr_short < curr_long {
        Side::Sell
    } else {
        return None;
    };

    Some(CrossoverEvent {
        index,
        timestamp: point.timestamp,
        price: point.price,
        side,
    })
}

/// Scans every index from `start_index` to the end of the series.
pub fn detect_crossovers(
    series: &PriceSeries,
    short: &[Option<f64>],
    long: &[Option<f64>],
    start_index: usize,
) -> Crossovers {
    let mut found = Crossovers::default();
    for index in start_index.max(1)..series.len() {
        match crossover_at(series, short, long, index) {
            Some(event) if event.side == Side::Buy => found.buys.push(event),
            Some(event) => found.sells.push(event),
            None => {}
        }
    }
    found
}

/// Checks only the newest index pair. Used on every live tick.
pub fn latest_crossover(
    series: &PriceSeries,
    short: &[Option<f64>],
    long: &[Option<f64>],
) -> Option<CrossoverEvent> {
    let last = series.len().checked_sub(1)?;
    crossover_at(series, short, long, last)
}

/// The moving-average crossover strategy bound to its configured periods.
#[derive(Debug, Clone)]
pub struct MACrossover {
    settings: MACrossoverSettings,
}

impl MACrossover {
    pub fn new(settings: MACrossoverSettings) -> Self {
        Self { settings }
    }

    pub fn name(&self) -> &'static str {
        "MACrossover"
    }

    pub fn settings(&self) -> &MACrossoverSettings {
        &self.settings
    }

    /// Both averages over the current window.
    pub fn averages(&self, series: &PriceSeries) -> MovingAverages {
        MovingAverages::compute(
            &series.prices(),
            self.settings.short_period as usize,
            self.settings.long_period as usize,
        )
    }

    /// Full rescan of the window, starting where the long average is defined.
    pub fn scan(&self, series: &PriceSeries, averages: &MovingAverages) -> Crossovers {
        detect_crossovers(
            series,
            &averages.short,
            &averages.long,
            self.settings.long_period as usize,
        )
    }

    /// Looks for a crossover on the newest sample only.
    pub fn assess(&self, series: &PriceSeries, averages: &MovingAverages) -> Option<CrossoverEvent> {
        let event = latest_crossover(series, &averages.short, &averages.long);
        if let Some(event) = &event {
            tracing::debug!(strategy = self.name(), side = %event.side, price = event.price, "Crossover detected.");
        }
        event
    }
}
