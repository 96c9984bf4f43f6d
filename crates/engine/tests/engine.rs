use app_config::{BotSettings, Settings};
use async_trait::async_trait;
use core_types::{Side, Symbol};
use engine::{Engine, Error, TickOutcome};
use events::{EngineEvent, LogEntry, Severity};
use risk::{BalanceCheck, BalanceGate, StaticBalanceGate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.app.seed = Some(11);
    settings.bot = BotSettings {
        short_period: 2,
        long_period: 10,
        investment: dec!(110),
        poll_interval_secs: 10,
        ..BotSettings::default()
    };
    settings
}

fn engine_with(gate: Arc<dyn BalanceGate>) -> Engine {
    Engine::new(settings(), gate).unwrap()
}

fn count(logs: &[LogEntry], severity: Severity) -> usize {
    logs.iter().filter(|e| e.severity == severity).count()
}

struct FailingGate;

#[async_trait]
impl BalanceGate for FailingGate {
    fn name(&self) -> &'static str {
        "FailingGate"
    }

    async fn check_balance(&self, _symbol: &Symbol, _required: Decimal) -> risk::Result<BalanceCheck> {
        Err(risk::Error::Unavailable("connection reset".to_string()))
    }
}

/// Holds every check until released.
struct BlockingGate {
    reached: Notify,
    release: Notify,
    available: Decimal,
}

impl BlockingGate {
    fn approving_up_to(available: Decimal) -> Self {
        Self {
            reached: Notify::new(),
            release: Notify::new(),
            available,
        }
    }
}

impl Default for BlockingGate {
    fn default() -> Self {
        Self::approving_up_to(dec!(1000))
    }
}

#[async_trait]
impl BalanceGate for BlockingGate {
    fn name(&self) -> &'static str {
        "BlockingGate"
    }

    async fn check_balance(&self, _symbol: &Symbol, required: Decimal) -> risk::Result<BalanceCheck> {
        self.reached.notify_one();
        self.release.notified().await;
        Ok(BalanceCheck::evaluate(required, self.available))
    }
}

/// Never answers the first check, approves every later one.
#[derive(Default)]
struct StallingGate {
    stalled: AtomicBool,
}

#[async_trait]
impl BalanceGate for StallingGate {
    fn name(&self) -> &'static str {
        "StallingGate"
    }

    async fn check_balance(&self, _symbol: &Symbol, required: Decimal) -> risk::Result<BalanceCheck> {
        if !self.stalled.swap(true, Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(BalanceCheck::evaluate(required, dec!(1000)))
    }
}

#[tokio::test]
async fn crossover_drives_a_full_round_trip() {
    let engine = engine_with(Arc::new(StaticBalanceGate::new(dec!(1000))));
    assert_eq!(engine.seed_history(&[100.0; 10]).await.unwrap(), 0);

    // short 105 vs long 101 after a tie: BUY at the signal price
    let TickOutcome::Entered(buy) = engine.ingest(110.0).await.unwrap() else {
        panic!("expected an entry");
    };
    assert_eq!(buy.side, Side::Buy);
    assert_eq!(buy.quantity, dec!(1));
    assert_eq!(buy.total_value, dec!(110));

    assert_eq!(engine.ingest(121.0).await.unwrap(), TickOutcome::Quiet);
    let position = engine.position().await.unwrap();
    assert_eq!(position.unrealized_pnl, dec!(11));
    assert!((position.unrealized_pnl_pct - 10.0).abs() < 1e-9);

    let TickOutcome::Exited(sell) = engine.ingest(50.0).await.unwrap() else {
        panic!("expected an exit");
    };
    assert_eq!(sell.side, Side::Sell);
    assert_eq!(sell.price, dec!(50));
    assert!(engine.position().await.is_none());

    let trades = engine.trades().await;
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].side, Side::Sell);

    let stats = engine.stats().await;
    assert_eq!(stats.trade_count, 1);
    assert_eq!(stats.win_rate, 0.0);
    assert!(stats.total_profit < 0.0);

    let live = engine.live_stats().await;
    assert!((live.total_profit + 60.0).abs() < 1e-9);

    let chart = engine.chart().await;
    assert_eq!(chart.points.len(), 13);
    assert_eq!(chart.markers.buys.len(), 1);
    assert_eq!(chart.markers.sells.len(), 1);
}

#[tokio::test]
async fn gate_rejection_leaves_state_untouched() {
    let engine = engine_with(Arc::new(StaticBalanceGate::new(dec!(50))));
    engine.seed_history(&[100.0; 10]).await.unwrap();
    let before = engine.logs().await;

    let outcome = engine.ingest(110.0).await.unwrap();
    assert!(matches!(outcome, TickOutcome::Rejected(ref reason) if reason.contains("Insufficient balance")));

    assert!(engine.trades().await.is_empty());
    assert!(engine.position().await.is_none());
    let after = engine.logs().await;
    assert_eq!(count(&after, Severity::Warning) - count(&before, Severity::Warning), 1);
}

#[tokio::test]
async fn gate_failure_is_logged_as_error() {
    let engine = engine_with(Arc::new(FailingGate));
    engine.seed_history(&[100.0; 10]).await.unwrap();

    let outcome = engine.ingest(110.0).await.unwrap();
    assert!(matches!(outcome, TickOutcome::Rejected(_)));
    assert!(engine.trades().await.is_empty());

    let logs = engine.logs().await;
    assert_eq!(count(&logs, Severity::Error), 1);
    assert!(logs.last().unwrap().message.contains("connection reset"));
}

#[tokio::test]
async fn sell_signal_while_flat_is_rejected() {
    let engine = engine_with(Arc::new(StaticBalanceGate::new(dec!(1000))));
    engine.seed_history(&[100.0; 10]).await.unwrap();

    let outcome = engine.ingest(90.0).await.unwrap();
    assert_eq!(outcome, TickOutcome::Rejected("No open position to close".to_string()));
    assert!(engine.trades().await.is_empty());
}

#[tokio::test]
async fn manual_close() {
    let engine = engine_with(Arc::new(StaticBalanceGate::new(dec!(1000))));
    engine.seed_history(&[100.0; 10]).await.unwrap();

    assert!(matches!(engine.manual_close().await.unwrap(), TickOutcome::Rejected(_)));

    engine.ingest(110.0).await.unwrap();
    engine.ingest(121.0).await.unwrap();
    let TickOutcome::Exited(sell) = engine.manual_close().await.unwrap() else {
        panic!("expected an exit");
    };
    assert_eq!(sell.price, dec!(121));
    assert_eq!(sell.realized_profit_percent, Some(10.0));

    let stats = engine.stats().await;
    assert_eq!(stats.total_profit, 10.0);
    assert_eq!(stats.win_rate, 100.0);
    assert_eq!(stats.trade_count, 1);
    assert!((stats.profit_today - 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn analysis_needs_data() {
    let engine = engine_with(Arc::new(StaticBalanceGate::new(dec!(1000))));
    assert!(matches!(
        engine.request_analysis().await,
        Err(Error::Analysis(analytics::Error::InsufficientData))
    ));

    engine.seed_history(&[100.0; 10]).await.unwrap();
    engine.ingest(110.0).await.unwrap();
    let snapshot = engine.request_analysis().await.unwrap();
    assert_eq!(snapshot.current_price, 110.0);
    assert_eq!(snapshot.signal, analytics::Bias::Buy);
    assert!((65..85).contains(&snapshot.strength));
}

#[tokio::test]
async fn invalid_settings_keep_previous_ones() {
    let engine = engine_with(Arc::new(StaticBalanceGate::new(dec!(1000))));
    let before = engine.settings().await;

    let bad = BotSettings { short_period: 1, ..before.clone() };
    assert!(matches!(engine.configure(bad).await, Err(Error::InvalidConfig(_))));
    assert_eq!(engine.settings().await, before);

    engine.seed_history(&[100.0; 10]).await.unwrap();
    engine.ingest(110.0).await.unwrap();

    let good = BotSettings { short_period: 3, ..before };
    engine.configure(good).await.unwrap();
    assert_eq!(engine.settings().await.short_period, 3);
    assert_eq!(engine.chart().await.short_label, "EMA3");
    assert_eq!(engine.trades().await.len(), 1);
    assert!(engine.position().await.is_some());
}

#[tokio::test]
async fn start_and_stop_are_idempotent() {
    let engine = engine_with(Arc::new(StaticBalanceGate::new(dec!(1000))));

    engine.stop().await;
    engine.start().await.unwrap();
    engine.start().await.unwrap();
    assert!(engine.is_running().await);
    assert_eq!(engine.chart().await.points.len(), 100);

    engine.stop().await;
    engine.stop().await;
    assert!(!engine.is_running().await);

    let logs = engine.logs().await;
    let started = logs.iter().filter(|e| e.message.starts_with("Bot started")).count();
    let stopped = logs.iter().filter(|e| e.message == "Bot stopped").count();
    assert_eq!((started, stopped), (1, 1));
    assert!(logs.iter().any(|e| e.message == "Bot started with EMA2 and EMA10 on SOLUSDT 15m"));
}

#[tokio::test]
async fn late_approval_after_stop_is_discarded() {
    let gate = Arc::new(BlockingGate::default());
    let engine = engine_with(gate.clone());
    engine.seed_history(&[100.0; 10]).await.unwrap();
    engine.start().await.unwrap();

    let worker = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.ingest(110.0).await })
    };
    gate.reached.notified().await;

    engine.stop().await;
    gate.release.notify_one();

    assert_eq!(worker.await.unwrap().unwrap(), TickOutcome::Discarded);
    assert!(engine.position().await.is_none());
    assert!(engine.trades().await.is_empty());
}

#[tokio::test]
async fn manual_close_proceeds_while_entry_is_pending() {
    let gate = Arc::new(BlockingGate::default());
    let engine = engine_with(gate.clone());
    engine.seed_history(&[100.0; 10]).await.unwrap();

    let worker = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.ingest(110.0).await })
    };
    gate.reached.notified().await;

    // Flat while the check is pending
    assert!(matches!(engine.manual_close().await.unwrap(), TickOutcome::Rejected(_)));
    assert!(engine.position().await.is_none());

    gate.release.notify_one();
    assert!(matches!(worker.await.unwrap().unwrap(), TickOutcome::Entered(_)));
    assert!(engine.position().await.is_some());
}

#[tokio::test]
async fn entry_opens_with_the_amount_the_gate_approved() {
    let gate = Arc::new(BlockingGate::approving_up_to(dec!(150)));
    let engine = engine_with(gate.clone());
    engine.seed_history(&[100.0; 10]).await.unwrap();

    let worker = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.ingest(110.0).await })
    };
    gate.reached.notified().await;

    let raised = BotSettings { investment: dec!(5000), ..engine.settings().await };
    engine.configure(raised).await.unwrap();
    gate.release.notify_one();

    let TickOutcome::Entered(buy) = worker.await.unwrap().unwrap() else {
        panic!("expected an entry");
    };
    assert_eq!(buy.total_value, dec!(110));
    assert_eq!(engine.position().await.unwrap().quantity, dec!(1));
    assert_eq!(engine.settings().await.investment, dec!(5000));
}

#[tokio::test]
async fn abandoned_balance_check_does_not_block_later_entries() {
    let engine = engine_with(Arc::new(StallingGate::default()));
    engine.seed_history(&[100.0; 10]).await.unwrap();

    let abandoned = tokio::time::timeout(Duration::from_millis(50), engine.ingest(110.0)).await;
    assert!(abandoned.is_err());
    assert!(engine.position().await.is_none());

    // short 80 vs long 96: SELL while flat
    assert!(matches!(engine.ingest(50.0).await.unwrap(), TickOutcome::Rejected(_)));

    // short 125 vs long 106: a fresh BUY goes through
    assert!(matches!(engine.ingest(200.0).await.unwrap(), TickOutcome::Entered(_)));
    assert!(engine.position().await.is_some());
}

#[tokio::test]
async fn symbol_change_reloads_the_window_only() {
    let engine = engine_with(Arc::new(StaticBalanceGate::new(dec!(1000))));
    engine.seed_history(&[100.0; 10]).await.unwrap();
    engine.ingest(110.0).await.unwrap();
    engine.manual_close().await.unwrap();
    assert_eq!(engine.trades().await.len(), 2);

    let btc = BotSettings { symbol: Symbol::from("BTCUSDT"), ..engine.settings().await };
    engine.configure(btc).await.unwrap();

    let chart = engine.chart().await;
    assert_eq!(chart.points.len(), 100);
    assert!(!chart.points.iter().all(|p| p.price == 100.0));
    assert_eq!(engine.trades().await.len(), 2);
    assert!(engine.logs().await.iter().any(|e| e.message == "Loaded 100 price samples for BTCUSDT"));
}

#[tokio::test]
async fn symbol_change_is_refused_while_in_a_position() {
    let engine = engine_with(Arc::new(StaticBalanceGate::new(dec!(1000))));
    engine.seed_history(&[100.0; 10]).await.unwrap();
    engine.ingest(110.0).await.unwrap();
    let before = engine.settings().await;

    let btc = BotSettings { symbol: Symbol::from("BTCUSDT"), ..before.clone() };
    assert!(matches!(engine.configure(btc).await, Err(Error::InvalidConfig(_))));
    assert_eq!(engine.settings().await, before);
    assert_eq!(engine.chart().await.points.len(), 11);
    assert!(engine.position().await.is_some());
}

#[tokio::test]
async fn symbol_change_during_balance_check_rejects_the_entry() {
    let gate = Arc::new(BlockingGate::default());
    let engine = engine_with(gate.clone());
    engine.seed_history(&[100.0; 10]).await.unwrap();

    let worker = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.ingest(110.0).await })
    };
    gate.reached.notified().await;

    let btc = BotSettings { symbol: Symbol::from("BTCUSDT"), ..engine.settings().await };
    engine.configure(btc).await.unwrap();
    gate.release.notify_one();

    assert!(matches!(worker.await.unwrap().unwrap(), TickOutcome::Rejected(_)));
    assert!(engine.position().await.is_none());
    assert!(engine.trades().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn loop_ticks_on_the_poll_interval_until_stopped() {
    let engine = engine_with(Arc::new(StaticBalanceGate::new(dec!(1000))));
    let mut events = engine.subscribe();

    engine.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(35)).await;
    engine.stop().await;

    let mut ticks = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, EngineEvent::Tick { .. }) {
            ticks += 1;
        }
    }
    assert!(ticks >= 3, "expected at least 3 ticks, saw {ticks}");

    tokio::time::sleep(Duration::from_secs(60)).await;
    while let Ok(event) = events.try_recv() {
        assert!(!matches!(event, EngineEvent::Tick { .. }), "tick after stop");
    }
}
