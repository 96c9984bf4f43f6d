// In crates/engine/src/lib.rs

pub mod error;
pub mod feed;
mod state;
mod task;
pub mod types;

pub use error::{Error, Result};
pub use feed::SyntheticFeed;
pub use types::{ChartData, ChartMarkers, TickOutcome};

use crate::state::EngineState;
use crate::task::Runner;
use analytics::{AnalysisSnapshot, Stats};
use app_config::{BotSettings, Settings};
use chrono::Utc;
use core_types::{Position, PricePoint, Side, Trade};
use events::{EngineEvent, LogEntry, Severity};
use risk::{BalanceGate, SimulatedBalanceGate};
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};

/// Capacity of the event broadcast; slow subscribers lag rather than block.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The simulation driver.
///
/// `Engine` is a cheap handle: clones share one state. Every mutation of the
/// price window, the position and the ledger happens behind a single mutex,
/// and samples are processed one at a time in arrival order. The only
/// suspension point inside a tick is the balance gate, awaited without holding
/// the state lock so manual closes and observers stay responsive.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<EngineState>,
    /// Serializes tick processing so a signal is resolved before the next sample.
    turn: Mutex<()>,
    runner: Mutex<Option<Runner>>,
    gate: Arc<dyn BalanceGate>,
    events: broadcast::Sender<EngineEvent>,
}

impl Engine {
    pub fn new(settings: Settings, gate: Arc<dyn BalanceGate>) -> Result<Self> {
        settings.validate()?;
        tracing::info!(gate = gate.name(), symbol = %settings.bot.symbol, "Initializing engine.");

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let state = EngineState::new(settings, events.clone());

        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                turn: Mutex::new(()),
                runner: Mutex::new(None),
                gate,
                events,
            }),
        })
    }

    /// An engine wired to the simulated balance gate described by `settings`.
    pub fn simulated(settings: Settings) -> Result<Self> {
        let seed = settings.app.seed.map(|s| s.wrapping_add(2));
        let gate = SimulatedBalanceGate::new(settings.balance_gate.clone(), seed)?;
        Self::new(settings, Arc::new(gate))
    }

    /// Validates and applies new bot settings.
    ///
    /// On error nothing changes. Both averages are recomputed over the current
    /// window; the ledger and any open position are kept. A symbol change
    /// reloads the window and is refused while a position is open. A running
    /// loop is restarted when the poll interval changes.
    pub async fn configure(&self, bot: BotSettings) -> Result<()> {
        if let Err(e) = bot.validate() {
            tracing::warn!(error = %e, "Rejected settings update.");
            return Err(e.into());
        }

        let restart = {
            let mut state = self.inner.state.lock().await;
            let restart = state.running && state.bot().poll_interval_secs != bot.poll_interval_secs;
            if let Err(e) = state.apply_settings(bot) {
                tracing::warn!(error = %e, "Rejected settings update.");
                return Err(e);
            }
            restart
        };

        if restart {
            self.stop().await;
            self.start().await?;
        }
        Ok(())
    }

    /// Starts the tick loop. A no-op while already running.
    ///
    /// On the first start the window is filled with synthetic history and the
    /// crossovers found in it are replayed as historical trades.
    pub async fn start(&self) -> Result<()> {
        let mut runner = self.inner.runner.lock().await;
        if runner.is_some() {
            return Ok(());
        }

        let period = {
            let mut state = self.inner.state.lock().await;
            if !state.has_history() {
                let points = state.synthetic_history();
                state.seed(points)?;
            }
            state.running = true;
            state.warn_if_window_too_short();
            let message = format!("Bot started with {}", state.describe());
            state.log(Severity::Success, message);
            state.publish(EngineEvent::Started);
            state.bot().poll_interval()
        };

        *runner = Some(Runner::spawn(self.clone(), period));
        Ok(())
    }

    /// Stops the tick loop and waits for it to exit. A no-op while stopped.
    ///
    /// A balance approval still in flight is discarded when it lands.
    pub async fn stop(&self) {
        let mut runner = self.inner.runner.lock().await;
        let Some(active) = runner.take() else {
            return;
        };

        {
            let mut state = self.inner.state.lock().await;
            state.running = false;
            state.session += 1;
        }

        active.shutdown().await;

        let mut state = self.inner.state.lock().await;
        state.log(Severity::Info, "Bot stopped");
        state.publish(EngineEvent::Stopped);
    }

    pub async fn is_running(&self) -> bool {
        self.inner.state.lock().await.running
    }

    /// Generates one synthetic price and processes it.
    pub async fn tick(&self) -> Result<TickOutcome> {
        let _turn = self.inner.turn.lock().await;
        let price = self.inner.state.lock().await.next_price();
        self.process(price).await
    }

    /// Processes an externally supplied price as the next sample.
    pub async fn ingest(&self, price: f64) -> Result<TickOutcome> {
        let _turn = self.inner.turn.lock().await;
        self.process(price).await
    }

    async fn process(&self, price: f64) -> Result<TickOutcome> {
        let request = {
            let mut state = self.inner.state.lock().await;
            let Some(signal) = state.apply_price(price)? else {
                return Ok(TickOutcome::Quiet);
            };
            if signal.side == Side::Sell {
                return state.exit(signal.timestamp);
            }
            if let Some(rejected) = state.refuse_entry() {
                return Ok(rejected);
            }
            state.entry_request(signal)
        };

        // --- Balance gate, awaited without the state lock ---
        // The held `turn` keeps a second entry out until this one resolves or
        // the caller drops the future.
        let check = self
            .inner
            .gate
            .check_balance(&request.symbol, request.required)
            .await;

        self.inner.state.lock().await.finish_entry(request, check)
    }

    /// Fills an empty window with synthetic history and replays it.
    ///
    /// Returns the number of historical trades recorded, or 0 when the window
    /// already holds samples.
    pub async fn load_history(&self) -> Result<usize> {
        let _turn = self.inner.turn.lock().await;
        let mut state = self.inner.state.lock().await;
        if state.has_history() {
            return Ok(0);
        }
        let points = state.synthetic_history();
        state.seed(points)
    }

    /// Replaces the window with `prices`, spaced by the configured timeframe
    /// and ending now, and replays its crossovers as historical trades.
    pub async fn seed_history(&self, prices: &[f64]) -> Result<usize> {
        let _turn = self.inner.turn.lock().await;
        let mut state = self.inner.state.lock().await;

        let step = state.bot().timeframe.duration();
        let end = Utc::now();
        let last = prices.len().saturating_sub(1);
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                timestamp: end - step * i32::try_from(last - i).unwrap_or(i32::MAX),
                price,
            })
            .collect();
        state.seed(points)
    }

    /// Closes the open position at its current mark.
    ///
    /// While flat this is rejected with a warning, not an error.
    pub async fn manual_close(&self) -> Result<TickOutcome> {
        let mut state = self.inner.state.lock().await;
        let at = state.latest_timestamp();
        state.exit(at)
    }

    /// Technical snapshot of the current window.
    pub async fn request_analysis(&self) -> Result<AnalysisSnapshot> {
        self.inner.state.lock().await.analysis()
    }

    // --- Observers ---

    pub async fn settings(&self) -> BotSettings {
        self.inner.state.lock().await.bot().clone()
    }

    pub async fn position(&self) -> Option<Position> {
        self.inner.state.lock().await.position()
    }

    /// The ledger, newest trade first.
    pub async fn trades(&self) -> Vec<Trade> {
        self.inner.state.lock().await.trades()
    }

    /// Stats derived from the ledger.
    pub async fn stats(&self) -> Stats {
        self.inner.state.lock().await.stats()
    }

    /// Running stats folded in on every close of this session.
    pub async fn live_stats(&self) -> Stats {
        self.inner.state.lock().await.live_stats()
    }

    pub async fn logs(&self) -> Vec<LogEntry> {
        self.inner.state.lock().await.logs()
    }

    pub async fn chart(&self) -> ChartData {
        self.inner.state.lock().await.chart()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.inner.events.subscribe()
    }
}
