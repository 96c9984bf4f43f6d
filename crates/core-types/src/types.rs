// In crates/core-types/src/types.rs

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trading pair, e.g. `SOLUSDT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    /// The traded asset without its quote currency (`SOLUSDT` -> `SOL`).
    pub fn base_asset(&self) -> &str {
        self.0.strip_suffix("USDT").unwrap_or(&self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol(value.to_string())
    }
}

/// Direction of a crossover or of an executed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("BUY"),
            Side::Sell => f.write_str("SELL"),
        }
    }
}

/// A single sample of the price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// A crossover between the short and long moving averages.
///
/// `index` refers to the position inside the series the scan ran over; it is
/// only meaningful for that snapshot of the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrossoverEvent {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub side: Side,
}

/// The single open paper position.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Position {
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub current_price: Decimal,
    pub unrealized_pnl: Decimal,
    pub unrealized_pnl_pct: f64,
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Opens a position worth `investment` at `price`.
    pub fn open(investment: Decimal, price: Decimal, opened_at: DateTime<Utc>) -> Result<Self> {
        if price <= Decimal::ZERO {
            return Err(Error::InvalidPrice(price.to_f64().unwrap_or(0.0)));
        }
        if investment <= Decimal::ZERO {
            return Err(Error::InvalidAmount(investment.to_string()));
        }

        Ok(Self {
            quantity: investment / price,
            entry_price: price,
            current_price: price,
            unrealized_pnl: Decimal::ZERO,
            unrealized_pnl_pct: 0.0,
            opened_at,
        })
    }

    /// Re-marks the position against a new price and recomputes unrealized P&L.
    pub fn mark(&mut self, price: Decimal) {
        self.current_price = price;
        self.unrealized_pnl = (price - self.entry_price) * self.quantity;
        self.unrealized_pnl_pct = ((price - self.entry_price) / self.entry_price * Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or(0.0);
    }

    /// Value of the holding at the current mark.
    pub fn market_value(&self) -> Decimal {
        self.current_price * self.quantity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TradeId(pub u64);

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a trade came from the seeded history or from the live tick loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeOrigin {
    Historical,
    Live,
}

/// An executed paper trade. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub id: TradeId,
    pub timestamp: DateTime<Utc>,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub total_value: Decimal,
    /// Realized profit in percent of the entry price. Only set on exits.
    pub realized_profit_percent: Option<f64>,
    pub origin: TradeOrigin,
}
