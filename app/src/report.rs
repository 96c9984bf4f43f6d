// In app/src/report.rs

use analytics::{AnalysisSnapshot, Stats};
use app_config::BotSettings;
use core_types::{Side, Trade};
use engine::Engine;

pub fn print_trade(trade: &Trade) {
    let realized = match (trade.side, trade.realized_profit_percent) {
        (Side::Sell, Some(pct)) => format!(" | {:+.2}%", pct),
        _ => String::new(),
    };
    println!(
        "{:>5} {} {:<4} {:>12.4} @ {:>10.2} = {:>10.2}{} ({:?})",
        trade.id.to_string(),
        trade.timestamp.format("%Y-%m-%d %H:%M"),
        trade.side.to_string(),
        trade.quantity,
        trade.price,
        trade.total_value,
        realized,
        trade.origin,
    );
}

pub fn print_ledger(trades: &[Trade]) {
    println!("\n--- Trade Ledger (newest first) ---");
    if trades.is_empty() {
        println!("  No trades.");
        return;
    }
    for trade in trades {
        print_trade(trade);
    }
}

pub fn print_stats(stats: &Stats) {
    println!("\n--- Performance ---");
    println!("  Total P&L:   {:+.2}%", stats.total_profit);
    println!("  Today:       {:+.2}%", stats.profit_today);
    println!("  Win Rate:    {:.2}%", stats.win_rate);
    println!("  Trades:      {}", stats.trade_count);
}

pub fn print_analysis(bot: &BotSettings, snapshot: &AnalysisSnapshot) {
    println!("\n--- Analysis: {} {} ---", bot.symbol, bot.timeframe);
    println!("  Trend:       {} (strength {})", snapshot.trend, snapshot.strength);
    println!("  Signal:      {}", snapshot.signal);
    println!("  Price:       {:.2}", snapshot.current_price);
    println!("  Resistance:  {:.2}", snapshot.resistance);
    println!("  Support:     {:.2}", snapshot.support);
    println!("  RSI(14):     {:.2}", snapshot.oscillator);
    println!("  {}", snapshot.ma_status);
}

/// End-of-run summary: the open position, the ledger and both stat views.
pub async fn print_session(engine: &Engine) {
    println!("\n--- Session Complete ---");
    match engine.position().await {
        Some(position) => println!(
            "  Open position: {:.4} @ {:.2}, mark {:.2}, P&L {:.2} ({:+.2}%)",
            position.quantity,
            position.entry_price,
            position.current_price,
            position.unrealized_pnl,
            position.unrealized_pnl_pct
        ),
        None => println!("  Flat."),
    }

    print_ledger(&engine.trades().await);
    print_stats(&engine.stats().await);

    let live = engine.live_stats().await;
    println!(
        "  Session P&L: {:+.2} over {} closes ({:.2}% winners)",
        live.total_profit, live.trade_count, live.win_rate
    );
}
