// In crates/engine/src/state.rs

use crate::feed::SyntheticFeed;
use crate::types::{ChartData, ChartMarkers, TickOutcome};
use crate::Result;
use analytics::{AnalysisSnapshot, Stats};
use app_config::{BotSettings, Settings};
use chrono::{DateTime, Utc};
use core_types::{CrossoverEvent, Position, PricePoint, PriceSeries, Symbol, Trade, TradeOrigin};
use events::{EngineEvent, LogBook, LogEntry, Notice, Severity};
use execution::PaperPositionManager;
use rand::rngs::StdRng;
use rand::SeedableRng;
use risk::BalanceCheck;
use rust_decimal::Decimal;
use strategies::{MACrossover, MovingAverages};
use tokio::sync::broadcast;

/// A BUY awaiting the balance gate, captured when the signal fired.
pub(crate) struct EntryRequest {
    pub(crate) signal: CrossoverEvent,
    pub(crate) session: u64,
    pub(crate) symbol: Symbol,
    pub(crate) required: Decimal,
}

/// All mutable engine state. Only ever touched behind the engine's mutex.
pub(crate) struct EngineState {
    settings: Settings,
    strategy: MACrossover,
    series: PriceSeries,
    averages: MovingAverages,
    markers: ChartMarkers,
    positions: PaperPositionManager,
    logs: LogBook,
    feed: SyntheticFeed,
    analyst_rng: StdRng,
    events: broadcast::Sender<EngineEvent>,
    pub(crate) running: bool,
    /// Bumped on every stop; gate answers from an older session are dropped.
    pub(crate) session: u64,
}

impl EngineState {
    pub(crate) fn new(settings: Settings, events: broadcast::Sender<EngineEvent>) -> Self {
        let seed = settings.app.seed;
        let analyst_rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };

        Self {
            strategy: MACrossover::new(settings.bot.crossover_settings()),
            series: PriceSeries::new(settings.simulation.window_size),
            averages: MovingAverages::default(),
            markers: ChartMarkers::default(),
            positions: PaperPositionManager::new(settings.bot.symbol.clone()),
            logs: LogBook::new(),
            feed: SyntheticFeed::new(settings.simulation.clone(), seed),
            analyst_rng,
            events,
            running: false,
            session: 0,
            settings,
        }
    }

    // --- Event plumbing ---

    pub(crate) fn publish(&self, event: EngineEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub(crate) fn log(&mut self, severity: Severity, message: impl Into<String>) {
        let entry = self.logs.push(severity, message);
        self.publish(EngineEvent::Log(entry));
    }

    fn notify(&self, title: &str, message: String, severity: Severity) {
        self.publish(EngineEvent::Notice(Notice {
            title: title.to_string(),
            message,
            severity,
        }));
    }

    fn reject(&mut self, severity: Severity, reason: String) -> TickOutcome {
        self.log(severity, reason.clone());
        self.notify("Order rejected", reason.clone(), severity);
        self.publish(EngineEvent::Rejected { reason: reason.clone() });
        TickOutcome::Rejected(reason)
    }

    // --- Settings ---

    pub(crate) fn bot(&self) -> &BotSettings {
        &self.settings.bot
    }

    pub(crate) fn describe(&self) -> String {
        let crossover = self.strategy.settings();
        format!(
            "{} and {} on {} {}",
            crossover.short_label(),
            crossover.long_label(),
            self.settings.bot.symbol,
            self.settings.bot.timeframe
        )
    }

    /// Swaps in validated bot settings and recomputes both averages.
    ///
    /// A new symbol replaces the price window with fresh samples for that
    /// instrument; the ledger is left as is. Switching symbols while a
    /// position is open is refused and leaves the settings untouched.
    pub(crate) fn apply_settings(&mut self, bot: BotSettings) -> Result<()> {
        let symbol_changed = bot.symbol != self.settings.bot.symbol;
        if symbol_changed && self.positions.position().is_some() {
            return Err(app_config::Error::Invalid {
                field: "symbol",
                message: format!(
                    "cannot switch to {} while a {} position is open",
                    bot.symbol, self.settings.bot.symbol
                ),
            }
            .into());
        }

        self.positions.set_symbol(bot.symbol.clone());
        self.strategy = MACrossover::new(bot.crossover_settings());
        self.settings.bot = bot;

        if symbol_changed && self.has_history() {
            let points = self.synthetic_history();
            self.series = PriceSeries::from_points(self.settings.simulation.window_size, points)?;
            let message = format!(
                "Loaded {} price samples for {}",
                self.series.len(),
                self.settings.bot.symbol
            );
            self.log(Severity::Info, message);
        }

        self.averages = self.strategy.averages(&self.series);
        self.markers = ChartMarkers::from_scan(&self.strategy.scan(&self.series, &self.averages));

        let message = format!("Settings updated: {}", self.describe());
        self.log(Severity::Info, message);
        self.warn_if_window_too_short();
        Ok(())
    }

    pub(crate) fn warn_if_window_too_short(&mut self) {
        let long = self.settings.bot.long_period as usize;
        let window = self.series.capacity();
        if long > window {
            self.log(
                Severity::Warning,
                format!("Long period {long} exceeds the {window}-sample window, no signals will fire"),
            );
        }
    }

    // --- History ---

    pub(crate) fn has_history(&self) -> bool {
        !self.series.is_empty()
    }

    pub(crate) fn synthetic_history(&mut self) -> Vec<PricePoint> {
        let count = self.series.capacity();
        let step = self.settings.bot.timeframe.duration();
        self.feed.history(count, Utc::now(), step)
    }

    /// Replaces the window with `points` and replays every crossover found in
    /// it as historical trades. Returns the number of trades recorded.
    pub(crate) fn seed(&mut self, points: Vec<PricePoint>) -> Result<usize> {
        self.series = PriceSeries::from_points(self.settings.simulation.window_size, points)?;
        self.averages = self.strategy.averages(&self.series);

        let found = self.strategy.scan(&self.series, &self.averages);
        self.markers = ChartMarkers::from_scan(&found);
        let recorded = self
            .positions
            .replay_historical(&found.chronological(), self.settings.bot.investment)?;

        self.log(
            Severity::Info,
            format!(
                "Loaded {} price samples and {} historical trades",
                self.series.len(),
                recorded
            ),
        );
        Ok(recorded)
    }

    // --- Ticking ---

    fn next_timestamp(&self) -> DateTime<Utc> {
        match self.series.last() {
            Some(last) => last.timestamp + self.settings.bot.timeframe.duration(),
            None => Utc::now(),
        }
    }

    pub(crate) fn next_price(&mut self) -> f64 {
        let previous = self.series.last().map(|p| p.price);
        self.feed.next_price(previous)
    }

    /// Pushes one sample, recomputes the averages, re-marks the position and
    /// checks the newest index pair for a crossover.
    pub(crate) fn apply_price(&mut self, price: f64) -> Result<Option<CrossoverEvent>> {
        let point = PricePoint {
            timestamp: self.next_timestamp(),
            price,
        };
        self.series.push(point)?;
        self.averages = self.strategy.averages(&self.series);
        if let Some(oldest) = self.series.oldest_timestamp() {
            self.markers.prune(oldest);
        }
        self.publish(EngineEvent::Tick { price });

        if let Some(position) = self.positions.mark(price)?.cloned() {
            self.publish(EngineEvent::PositionUpdate(Some(position)));
        }

        let signal = self.strategy.assess(&self.series, &self.averages);
        if let Some(event) = signal {
            self.markers.record(&event);
            self.log(
                Severity::Info,
                format!("{} signal detected at {:.2}", event.side, event.price),
            );
            self.publish(EngineEvent::SignalDetected(event));
        }
        Ok(signal)
    }

    /// Rejects a BUY signal while a position is already open.
    pub(crate) fn refuse_entry(&mut self) -> Option<TickOutcome> {
        self.positions.position().is_some().then(|| {
            self.reject(
                Severity::Warning,
                "Already in a position, BUY signal ignored".to_string(),
            )
        })
    }

    /// Applies the balance gate's answer for an entry of `request.required`.
    ///
    /// The position is opened with exactly the amount the gate checked.
    pub(crate) fn finish_entry(
        &mut self,
        request: EntryRequest,
        check: risk::Result<BalanceCheck>,
    ) -> Result<TickOutcome> {
        let EntryRequest { signal, session, symbol, required } = request;
        if session != self.session {
            tracing::debug!(session, current = self.session, "Dropping balance answer from a stopped run.");
            return Ok(TickOutcome::Discarded);
        }
        if symbol != self.settings.bot.symbol {
            let reason = format!("Symbol changed to {} during the balance check", self.settings.bot.symbol);
            return Ok(self.reject(Severity::Warning, reason));
        }

        match check {
            Err(e) => Ok(self.reject(Severity::Error, format!("Balance check failed: {e}"))),
            Ok(check) if !check.approved => {
                let reason = risk::Error::InsufficientBalance {
                    required,
                    available: check.available,
                };
                Ok(self.reject(Severity::Warning, reason.to_string()))
            }
            Ok(_) => self.enter(required, signal.price, signal.timestamp),
        }
    }

    /// The entry to put before the balance gate for a BUY signal.
    pub(crate) fn entry_request(&self, signal: CrossoverEvent) -> EntryRequest {
        EntryRequest {
            signal,
            session: self.session,
            symbol: self.settings.bot.symbol.clone(),
            required: self.settings.bot.investment,
        }
    }

    fn enter(&mut self, investment: Decimal, price: f64, at: DateTime<Utc>) -> Result<TickOutcome> {
        let trade = match self.positions.open(investment, price, at, TradeOrigin::Live) {
            Ok(trade) => trade,
            Err(e) if e.is_rejection() => return Ok(self.reject(Severity::Warning, e.to_string())),
            Err(e) => return Err(e.into()),
        };

        let message = format!(
            "Bought {} {} at {:.2} for {}",
            trade.quantity.round_dp(6),
            self.settings.bot.symbol.base_asset(),
            trade.price,
            trade.total_value
        );
        self.log(Severity::Success, message.clone());
        self.notify("Position opened", message, Severity::Success);
        self.publish(EngineEvent::TradeExecuted(trade.clone()));
        self.publish(EngineEvent::PositionUpdate(self.positions.position().cloned()));
        Ok(TickOutcome::Entered(trade))
    }

    /// Closes the open position at its current mark.
    pub(crate) fn exit(&mut self, at: DateTime<Utc>) -> Result<TickOutcome> {
        let (trade, closed) = match self.positions.close(at, TradeOrigin::Live) {
            Ok(closed) => closed,
            Err(e) if e.is_rejection() => {
                return Ok(self.reject(Severity::Warning, format!("{e} to close")));
            }
            Err(e) => return Err(e.into()),
        };

        let severity = if closed.unrealized_pnl > Decimal::ZERO {
            Severity::Success
        } else {
            Severity::Error
        };
        let message = format!(
            "Sold {} {} at {:.2}, P&L {} ({:.2}%)",
            trade.quantity.round_dp(6),
            self.settings.bot.symbol.base_asset(),
            trade.price,
            closed.unrealized_pnl.round_dp(2),
            closed.unrealized_pnl_pct
        );
        self.log(severity, message.clone());
        self.notify("Position closed", message, severity);
        self.publish(EngineEvent::TradeExecuted(trade.clone()));
        self.publish(EngineEvent::PositionUpdate(None));
        Ok(TickOutcome::Exited(trade))
    }

    /// Timestamp used for a manual close: the newest sample, or now.
    pub(crate) fn latest_timestamp(&self) -> DateTime<Utc> {
        self.series.last().map_or_else(Utc::now, |p| p.timestamp)
    }

    // --- Observers ---

    pub(crate) fn position(&self) -> Option<Position> {
        self.positions.position().cloned()
    }

    pub(crate) fn trades(&self) -> Vec<Trade> {
        self.positions.ledger().newest_first()
    }

    pub(crate) fn stats(&self) -> Stats {
        analytics::compute_stats(self.positions.ledger().trades())
    }

    pub(crate) fn live_stats(&self) -> Stats {
        self.positions.live_stats()
    }

    pub(crate) fn logs(&self) -> Vec<LogEntry> {
        self.logs.entries()
    }

    pub(crate) fn chart(&self) -> ChartData {
        let crossover = self.strategy.settings();
        ChartData {
            points: self.series.iter().copied().collect(),
            short_label: crossover.short_label(),
            long_label: crossover.long_label(),
            short: self.averages.short.clone(),
            long: self.averages.long.clone(),
            markers: self.markers.clone(),
        }
    }

    pub(crate) fn analysis(&mut self) -> Result<AnalysisSnapshot> {
        let crossover = self.strategy.settings().clone();
        let snapshot = analytics::analyze(
            &self.series.prices(),
            &self.averages.short,
            &self.averages.long,
            &crossover.short_label(),
            &crossover.long_label(),
            &mut self.analyst_rng,
        )?;
        Ok(snapshot)
    }
}
