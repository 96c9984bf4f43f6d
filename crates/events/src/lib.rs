// In crates/events/src/lib.rs

// --- Engine event structures, broadcast to UI/CLI subscribers ---

pub mod log;

pub use log::{LOG_CAPACITY, LogBook, LogEntry, Severity};

use core_types::{CrossoverEvent, Position, Trade};
use serde::Serialize;

/// A user-facing notice, the equivalent of a toast in a dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

/// The top-level event enum published by the engine.
/// `tag` and `content` are used by serde for clean JSON representation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum EngineEvent {
    Log(LogEntry),
    Notice(Notice),
    /// A new price sample was processed.
    Tick { price: f64 },
    SignalDetected(CrossoverEvent),
    /// The open position after the latest change; `None` once flat.
    PositionUpdate(Option<Position>),
    TradeExecuted(Trade),
    Rejected { reason: String },
    Started,
    Stopped,
}
