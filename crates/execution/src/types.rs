// In crates/execution/src/types.rs

use serde::Serialize;
use std::fmt;

/// The two states of the paper position manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PositionState {
    Flat,
    Open,
}

impl fmt::Display for PositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionState::Flat => f.write_str("FLAT"),
            PositionState::Open => f.write_str("OPEN"),
        }
    }
}
