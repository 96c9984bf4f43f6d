// In crates/strategies/src/moving_average.rs

//! Trailing arithmetic mean over a price series.
//!
//! Output index `i` is `None` while fewer than `period` samples are available
//! (`i < period - 1`), otherwise the mean of `series[i + 1 - period ..= i]`.

use ta::Next;
use ta::indicators::SimpleMovingAverage as Sma;

/// Computes the trailing windowed mean of `series`.
///
/// The result has the same length as the input. A `period` of zero yields an
/// all-`None` series.
pub fn moving_average(series: &[f64], period: usize) -> Vec<Option<f64>> {
    let Ok(mut sma) = Sma::new(period) else {
        return vec![None; series.len()];
    };

    // The indicator averages partial windows during warm-up; those are masked.
    series
        .iter()
        .enumerate()
        .map(|(i, &price)| {
            let mean = sma.next(price);
            (i + 1 >= period).then_some(mean)
        })
        .collect()
}

/// The short and long averages computed over the same window, index-aligned
/// with the price series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovingAverages {
    pub short: Vec<Option<f64>>,
    pub long: Vec<Option<f64>>,
}

impl MovingAverages {
    pub fn compute(prices: &[f64], short_period: usize, long_period: usize) -> Self {
        Self {
            short: moving_average(prices, short_period),
            long: moving_average(prices, long_period),
        }
    }

    /// The most recent (short, long) pair, if both are defined.
    pub fn latest(&self) -> Option<(f64, f64)> {
        match (self.short.last(), self.long.last()) {
            (Some(Some(short)), Some(Some(long))) => Some((*short, *long)),
            _ => None,
        }
    }
}
