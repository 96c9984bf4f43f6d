// In app/src/main.rs

use anyhow::{Context, Result};
use app_config::Settings;
use clap::{Parser, Subcommand};
use engine::Engine;
use events::EngineEvent;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::prelude::*;

mod report;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "A paper-trading moving-average crossover bot.")]
struct Cli {
    /// Optional TOML file holding a bot profile that replaces `[bot]` from the config.
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the simulation driver, printing trades and notices as they happen.
    Run {
        /// Stop automatically after this many seconds. Runs until Ctrl-C otherwise.
        #[arg(long)]
        duration_secs: Option<u64>,
    },

    /// Seeds a synthetic history and prints the resulting ledger and stats.
    History {
        /// Print as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Seeds a synthetic history and prints a technical analysis snapshot.
    Analyze {
        #[arg(long)]
        json: bool,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let cli = Cli::parse();

    let mut settings = app_config::load_settings().context("Failed to load settings")?;
    if let Some(path) = &cli.profile {
        settings.bot = app_config::load_bot_profile(path)
            .with_context(|| format!("Failed to load bot profile {}", path.display()))?;
    }

    init_tracing(&settings);
    tracing::info!(environment = %settings.app.environment, "Starting crossover bot");

    match cli.command {
        Commands::Run { duration_secs } => {
            run_bot(settings, duration_secs.map(Duration::from_secs)).await?;
        }
        Commands::History { json } => {
            handle_history(settings, json).await?;
        }
        Commands::Analyze { json } => {
            handle_analyze(settings, json).await?;
        }
    }

    tracing::info!("Crossover bot has finished successfully.");

    Ok(())
}

fn init_tracing(settings: &Settings) {
    let level = tracing::Level::from_str(&settings.app.log_level).unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new().with_default(level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();
}

// --- "Run" Subcommand Logic ---

/// Starts the engine and streams its events until Ctrl-C or the optional deadline.
async fn run_bot(settings: Settings, duration: Option<Duration>) -> Result<()> {
    let engine = Engine::simulated(settings)?;
    let mut events = engine.subscribe();

    engine.start().await?;

    let deadline = async {
        match duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            _ = &mut interrupted => {
                tracing::info!("Ctrl-C received, shutting down.");
                break;
            }
            _ = &mut deadline => {
                tracing::info!("Run duration elapsed, shutting down.");
                break;
            }
            event = events.recv() => match event {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event printer fell behind.");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    engine.stop().await;
    report::print_session(&engine).await;
    Ok(())
}

fn print_event(event: &EngineEvent) {
    match event {
        EngineEvent::TradeExecuted(trade) => report::print_trade(trade),
        EngineEvent::Notice(notice) => {
            println!("[{}] {}: {}", notice.severity, notice.title, notice.message);
        }
        // Log entries are already mirrored through tracing.
        _ => {}
    }
}

// --- "History" Subcommand Logic ---

async fn handle_history(settings: Settings, json: bool) -> Result<()> {
    let engine = Engine::simulated(settings)?;
    let recorded = engine.load_history().await?;
    tracing::info!(recorded, "Historical trades replayed.");

    let trades = engine.trades().await;
    let stats = engine.stats().await;
    if json {
        let body = serde_json::json!({ "trades": trades, "stats": stats });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        report::print_ledger(&trades);
        report::print_stats(&stats);
    }
    Ok(())
}

// --- "Analyze" Subcommand Logic ---

async fn handle_analyze(settings: Settings, json: bool) -> Result<()> {
    let engine = Engine::simulated(settings)?;
    engine.load_history().await?;

    let snapshot = engine.request_analysis().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        report::print_analysis(&engine.settings().await, &snapshot);
    }
    Ok(())
}
