// In crates/analytics/src/stats.rs

use crate::types::Stats;
use core_types::{Side, Trade};

/// Derives the aggregate statistics from a trade history.
///
/// Only exits with a realized profit percentage contribute. The result is a
/// pure function of `trades`: the ledger is the source of truth, `Stats` is a
/// view over it.
pub fn compute_stats(trades: &[Trade]) -> Stats {
    let profits: Vec<f64> = trades
        .iter()
        .filter(|t| t.side == Side::Sell)
        .filter_map(|t| t.realized_profit_percent)
        .collect();

    if profits.is_empty() {
        return Stats::default();
    }

    // 1. Totals
    let total_profit: f64 = profits.iter().sum();

    // 2. Win rate
    let winning = profits.iter().filter(|p| **p > 0.0).count();
    let win_rate = (winning as f64 / profits.len() as f64) * 100.0;

    Stats {
        profit_today: total_profit * Stats::PROFIT_TODAY_SHARE,
        total_profit,
        win_rate,
        trade_count: profits.len() as u32,
    }
}
