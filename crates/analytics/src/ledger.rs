// In crates/analytics/src/ledger.rs

use chrono::{DateTime, Utc};
use core_types::{Side, Trade, TradeId, TradeOrigin};
use rust_decimal::Decimal;

/// Append-only history of executed trades.
///
/// Trades are kept in execution order and are never mutated or removed.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    trades: Vec<Trade>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a trade, assigning it the next sequential id.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &mut self,
        timestamp: DateTime<Utc>,
        side: Side,
        price: Decimal,
        quantity: Decimal,
        total_value: Decimal,
        realized_profit_percent: Option<f64>,
        origin: TradeOrigin,
    ) -> Trade {
        let trade = Trade {
            id: TradeId(self.trades.len() as u64 + 1),
            timestamp,
            side,
            price,
            quantity,
            total_value,
            realized_profit_percent,
            origin,
        };
        self.trades.push(trade.clone());
        trade
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Trades in execution order.
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Trades for display, newest first.
    pub fn newest_first(&self) -> Vec<Trade> {
        self.trades.iter().rev().cloned().collect()
    }
}
