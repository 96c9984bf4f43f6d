// In crates/analytics/src/types.rs

use serde::Serialize;
use std::fmt;

/// Aggregate performance of the closed trades.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Stats {
    pub profit_today: f64,
    pub total_profit: f64,
    /// Percentage of winning exits, 0-100.
    pub win_rate: f64,
    pub trade_count: u32,
}

impl Stats {
    /// Share of the total profit attributed to the current accounting day.
    ///
    /// Trade timestamps of the seeded history are synthetic, so "today" is
    /// approximated as a fixed share of the total.
    pub const PROFIT_TODAY_SHARE: f64 = 0.3;

    /// Folds one realized exit into the running figures.
    ///
    /// The win rate is kept as a running weighted average over `trade_count`.
    pub fn record_close(&mut self, pnl: f64) {
        self.profit_today += pnl;
        self.total_profit += pnl;
        self.trade_count += 1;

        let n = self.trade_count as f64;
        let win = if pnl > 0.0 { 100.0 } else { 0.0 };
        self.win_rate = (self.win_rate * (n - 1.0) + win) / n;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Uptrend,
    Downtrend,
    Sideways,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Uptrend => f.write_str("Uptrend"),
            Trend::Downtrend => f.write_str("Downtrend"),
            Trend::Sideways => f.write_str("Sideways"),
        }
    }
}

/// Directional bias suggested by an analysis snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Bias {
    Buy,
    Sell,
    Neutral,
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bias::Buy => f.write_str("BUY"),
            Bias::Sell => f.write_str("SELL"),
            Bias::Neutral => f.write_str("NEUTRAL"),
        }
    }
}

/// On-demand technical read of the current window. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSnapshot {
    pub trend: Trend,
    /// Signal strength, 0-100.
    pub strength: u8,
    pub signal: Bias,
    pub current_price: f64,
    pub resistance: f64,
    pub support: f64,
    pub ma_status: String,
    /// 14-period relative strength index of the window, 0-100.
    pub oscillator: f64,
}
