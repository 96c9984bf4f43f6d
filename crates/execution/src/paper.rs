// In crates/execution/src/paper.rs

use crate::types::PositionState;
use crate::{Error, Result};
use analytics::{Ledger, Stats};
use chrono::{DateTime, Utc};
use core_types::{CrossoverEvent, Position, Side, Symbol, Trade, TradeOrigin};
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Owns the single paper position and the trade ledger.
///
/// State machine with two states:
/// * `Flat --open--> Open`: sizes the position as `investment / price` and
///   records a BUY.
/// * `Open --mark--> Open`: recomputes unrealized P&L.
/// * `Open --close--> Flat`: records a SELL at the current mark and folds the
///   realized P&L into the running stats.
///
/// Entering while open and exiting while flat are rejected without touching
/// any state.
#[derive(Debug)]
pub struct PaperPositionManager {
    symbol: Symbol,
    position: Option<Position>,
    ledger: Ledger,
    /// Running stats updated on every close.
    live_stats: Stats,
}

impl PaperPositionManager {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            position: None,
            ledger: Ledger::new(),
            live_stats: Stats::default(),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Relabels the manager after a settings change. Ledger and position are kept.
    pub fn set_symbol(&mut self, symbol: Symbol) {
        self.symbol = symbol;
    }

    pub fn state(&self) -> PositionState {
        if self.position.is_some() {
            PositionState::Open
        } else {
            PositionState::Flat
        }
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn live_stats(&self) -> Stats {
        self.live_stats
    }

    /// Opens a position worth `investment` at `price`.
    pub fn open(
        &mut self,
        investment: Decimal,
        price: f64,
        at: DateTime<Utc>,
        origin: TradeOrigin,
    ) -> Result<Trade> {
        if self.position.is_some() {
            return Err(Error::AlreadyInPosition);
        }

        let price = to_decimal(price)?;
        let position = Position::open(investment, price, at)?;

        let trade = self.ledger.record(
            at,
            Side::Buy,
            price,
            position.quantity,
            investment,
            None,
            origin,
        );
        tracing::info!(
            symbol = %self.symbol,
            quantity = %position.quantity,
            %price,
            "Position opened."
        );
        self.position = Some(position);
        Ok(trade)
    }

    /// Re-marks the open position, if any, at `price`.
    pub fn mark(&mut self, price: f64) -> Result<Option<&Position>> {
        let Some(position) = self.position.as_mut() else {
            return Ok(None);
        };
        position.mark(to_decimal(price)?);
        Ok(Some(&*position))
    }

    /// Closes the open position at its current mark.
    ///
    /// Returns the recorded SELL trade and the position as it was at close.
    pub fn close(&mut self, at: DateTime<Utc>, origin: TradeOrigin) -> Result<(Trade, Position)> {
        let position = self.position.take().ok_or(Error::NoOpenPosition)?;

        let trade = self.ledger.record(
            at,
            Side::Sell,
            position.current_price,
            position.quantity,
            position.market_value(),
            Some(position.unrealized_pnl_pct),
            origin,
        );
        self.live_stats
            .record_close(position.unrealized_pnl.to_f64().unwrap_or(0.0));

        tracing::info!(
            symbol = %self.symbol,
            pnl = %position.unrealized_pnl,
            pnl_pct = position.unrealized_pnl_pct,
            "Position closed."
        );
        Ok((trade, position))
    }

    /// Replays crossovers from seeded history without any admission check.
    ///
    /// Entries and exits alternate strictly: a BUY while open or a SELL while
    /// flat is skipped. Returns the number of trades recorded.
    pub fn replay_historical(
        &mut self,
        events: &[CrossoverEvent],
        investment: Decimal,
    ) -> Result<usize> {
        let before = self.ledger.len();
        for event in events {
            match (event.side, self.state()) {
                (Side::Buy, PositionState::Flat) => {
                    self.open(investment, event.price, event.timestamp, TradeOrigin::Historical)?;
                }
                (Side::Sell, PositionState::Open) => {
                    self.mark(event.price)?;
                    self.close(event.timestamp, TradeOrigin::Historical)?;
                }
                _ => {}
            }
        }
        Ok(self.ledger.len() - before)
    }
}

fn to_decimal(price: f64) -> Result<Decimal> {
    Decimal::from_f64(price).ok_or(Error::ExecutionFailed(core_types::Error::InvalidPrice(price)))
}
