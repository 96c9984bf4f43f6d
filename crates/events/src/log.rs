// In crates/events/src/log.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// Maximum number of entries kept in a `LogBook`.
pub const LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "INFO",
            Severity::Success => "SUCCESS",
            Severity::Warning => "WARN",
            Severity::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Represents a log message of the engine's session log.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub severity: Severity,
}

/// Ring of the most recent log entries, oldest evicted first.
#[derive(Debug, Clone)]
pub struct LogBook {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for LogBook {
    fn default() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }
}

impl LogBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an entry, mirrors it to `tracing`, and returns a copy of it.
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) -> LogEntry {
        let entry = LogEntry {
            timestamp: Utc::now(),
            message: message.into(),
            severity,
        };

        match severity {
            Severity::Info | Severity::Success => tracing::info!(severity = %severity, "{}", entry.message),
            Severity::Warning => tracing::warn!("{}", entry.message),
            Severity::Error => tracing::error!("{}", entry.message),
        }

        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.clone());
        entry
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}
