// In crates/strategies/src/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// The moving-average flavour selected by the user.
///
/// Only used for labelling: both kinds are computed as a plain windowed mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaKind {
    #[default]
    #[serde(rename = "EMA", alias = "ema")]
    Ema,
    #[serde(rename = "SMA", alias = "sma")]
    Sma,
}

impl fmt::Display for MaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaKind::Ema => f.write_str("EMA"),
            MaKind::Sma => f.write_str("SMA"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MACrossoverSettings {
    pub short_period: u32,
    pub long_period: u32,
    #[serde(default)]
    pub ma_kind: MaKind,
}

impl MACrossoverSettings {
    /// Display label of the short average, e.g. `EMA7`.
    pub fn short_label(&self) -> String {
        format!("{}{}", self.ma_kind, self.short_period)
    }

    /// Display label of the long average, e.g. `EMA40`.
    pub fn long_label(&self) -> String {
        format!("{}{}", self.ma_kind, self.long_period)
    }
}
