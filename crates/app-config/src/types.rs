// In crates/app-config/src/types.rs

use crate::{Error, Result};
use core_types::Symbol;
use risk::BalanceGateSettings;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use strategies::{MACrossoverSettings, MaKind};

pub const SHORT_PERIOD_RANGE: RangeInclusive<u32> = 2..=50;
pub const LONG_PERIOD_RANGE: RangeInclusive<u32> = 10..=200;
pub const POLL_INTERVAL_RANGE: RangeInclusive<u64> = 10..=300;

/// Candle spacing of the simulated price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[default]
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
}

impl Timeframe {
    pub fn duration(&self) -> chrono::Duration {
        match self {
            Timeframe::OneMinute => chrono::Duration::minutes(1),
            Timeframe::FiveMinutes => chrono::Duration::minutes(5),
            Timeframe::FifteenMinutes => chrono::Duration::minutes(15),
            Timeframe::OneHour => chrono::Duration::hours(1),
            Timeframe::FourHours => chrono::Duration::hours(4),
            Timeframe::OneDay => chrono::Duration::days(1),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Timeframe::OneMinute => "1m",
            Timeframe::FiveMinutes => "5m",
            Timeframe::FifteenMinutes => "15m",
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
            Timeframe::OneDay => "1d",
        };
        f.write_str(label)
    }
}

/// The user-facing bot configuration.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BotSettings {
    pub symbol: Symbol,
    #[serde(default)]
    pub timeframe: Timeframe,
    pub short_period: u32,
    pub long_period: u32,
    #[serde(default)]
    pub ma_kind: MaKind,
    /// Quote-currency amount committed per entry.
    pub investment: Decimal,
    /// Seconds between two price ticks.
    pub poll_interval_secs: u64,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            symbol: Symbol::from("SOLUSDT"),
            timeframe: Timeframe::FifteenMinutes,
            short_period: 7,
            long_period: 40,
            ma_kind: MaKind::Ema,
            investment: dec!(100),
            poll_interval_secs: 30,
        }
    }
}

impl BotSettings {
    /// Checks every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.0.trim().is_empty() {
            return Err(Error::Invalid {
                field: "symbol",
                message: "must not be empty".to_string(),
            });
        }
        if !SHORT_PERIOD_RANGE.contains(&self.short_period) {
            return Err(out_of_range("short_period", self.short_period, &SHORT_PERIOD_RANGE));
        }
        if !LONG_PERIOD_RANGE.contains(&self.long_period) {
            return Err(out_of_range("long_period", self.long_period, &LONG_PERIOD_RANGE));
        }
        if self.investment <= Decimal::ZERO {
            return Err(Error::Invalid {
                field: "investment",
                message: format!("must be positive, got {}", self.investment),
            });
        }
        if !POLL_INTERVAL_RANGE.contains(&self.poll_interval_secs) {
            return Err(out_of_range("poll_interval_secs", self.poll_interval_secs, &POLL_INTERVAL_RANGE));
        }
        Ok(())
    }

    pub fn crossover_settings(&self) -> MACrossoverSettings {
        MACrossoverSettings {
            short_period: self.short_period,
            long_period: self.long_period,
            ma_kind: self.ma_kind,
        }
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs)
    }
}

fn out_of_range<T: fmt::Display>(field: &'static str, value: T, range: &RangeInclusive<T>) -> Error {
    Error::Invalid {
        field,
        message: format!("{} is outside [{}, {}]", value, range.start(), range.end()),
    }
}

/// Parameters of the synthetic market.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    /// Number of samples kept in the sliding price window.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Range the seeded base price is drawn from.
    #[serde(default = "default_base_price_min")]
    pub base_price_min: f64,
    #[serde(default = "default_base_price_max")]
    pub base_price_max: f64,
    /// Floor applied to every generated price.
    #[serde(default = "default_min_price")]
    pub min_price: f64,
    /// Maximum absolute change of one live tick.
    #[serde(default = "default_tick_volatility")]
    pub tick_volatility: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            base_price_min: default_base_price_min(),
            base_price_max: default_base_price_max(),
            min_price: default_min_price(),
            tick_volatility: default_tick_volatility(),
        }
    }
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<()> {
        if self.window_size < 2 {
            return Err(Error::Invalid {
                field: "window_size",
                message: format!("must hold at least 2 samples, got {}", self.window_size),
            });
        }
        if !(self.min_price > 0.0 && self.min_price.is_finite()) {
            return Err(Error::Invalid {
                field: "min_price",
                message: format!("must be positive and finite, got {}", self.min_price),
            });
        }
        if !(self.base_price_min >= self.min_price
            && self.base_price_max > self.base_price_min
            && self.base_price_max.is_finite())
        {
            return Err(Error::Invalid {
                field: "base_price_max",
                message: "base price range must be finite, non-empty and above min_price".to_string(),
            });
        }
        if !(self.tick_volatility > 0.0 && self.tick_volatility.is_finite()) {
            return Err(Error::Invalid {
                field: "tick_volatility",
                message: format!("must be positive and finite, got {}", self.tick_volatility),
            });
        }
        Ok(())
    }
}

fn default_window_size() -> usize { 100 }
fn default_base_price_min() -> f64 { 100.0 }
fn default_base_price_max() -> f64 { 150.0 }
fn default_min_price() -> f64 { 0.01 }
fn default_tick_volatility() -> f64 { 1.0 }

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
    /// Seed for every random source. Unset means fresh entropy per run.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            seed: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    pub bot: BotSettings,
    #[serde(default)]
    pub balance_gate: BalanceGateSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.bot.validate()?;
        self.simulation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(BotSettings::default().validate().is_ok());
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn range_boundaries() {
        let base = BotSettings::default();

        let ok = BotSettings { short_period: 2, long_period: 200, poll_interval_secs: 300, ..base.clone() };
        assert!(ok.validate().is_ok());
        let ok = BotSettings { short_period: 50, long_period: 10, poll_interval_secs: 10, ..base.clone() };
        assert!(ok.validate().is_ok());

        let cases = [
            (BotSettings { short_period: 1, ..base.clone() }, "short_period"),
            (BotSettings { short_period: 51, ..base.clone() }, "short_period"),
            (BotSettings { long_period: 9, ..base.clone() }, "long_period"),
            (BotSettings { long_period: 201, ..base.clone() }, "long_period"),
            (BotSettings { investment: Decimal::ZERO, ..base.clone() }, "investment"),
            (BotSettings { poll_interval_secs: 9, ..base.clone() }, "poll_interval_secs"),
            (BotSettings { poll_interval_secs: 301, ..base.clone() }, "poll_interval_secs"),
            (BotSettings { symbol: Symbol::from(" "), ..base.clone() }, "symbol"),
        ];
        for (settings, expected) in cases {
            match settings.validate() {
                Err(Error::Invalid { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected {expected} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn parses_a_bot_profile() {
        let profile = r#"
            symbol = "BTCUSDT"
            timeframe = "1h"
            short_period = 9
            long_period = 21
            ma_kind = "SMA"
            investment = "250.5"
            poll_interval_secs = 60
        "#;
        let bot: BotSettings = toml::from_str(profile).unwrap();
        assert_eq!(bot.symbol, Symbol::from("BTCUSDT"));
        assert_eq!(bot.timeframe, Timeframe::OneHour);
        assert_eq!(bot.ma_kind, MaKind::Sma);
        assert_eq!(bot.investment, dec!(250.5));
        assert_eq!(bot.timeframe.duration(), chrono::Duration::hours(1));
        assert!(bot.validate().is_ok());
    }

    #[test]
    fn simulation_rejects_non_positive_floor() {
        let sim = SimulationSettings { min_price: 0.0, ..SimulationSettings::default() };
        assert!(matches!(sim.validate(), Err(Error::Invalid { field: "min_price", .. })));
    }

    #[test]
    fn simulation_rejects_unbounded_ranges() {
        let base = SimulationSettings::default();

        let sim = SimulationSettings { tick_volatility: f64::INFINITY, ..base.clone() };
        assert!(matches!(sim.validate(), Err(Error::Invalid { field: "tick_volatility", .. })));

        let sim = SimulationSettings { tick_volatility: f64::NAN, ..base.clone() };
        assert!(matches!(sim.validate(), Err(Error::Invalid { field: "tick_volatility", .. })));

        let sim = SimulationSettings { base_price_max: f64::INFINITY, ..base.clone() };
        assert!(matches!(sim.validate(), Err(Error::Invalid { field: "base_price_max", .. })));

        let sim = SimulationSettings { min_price: f64::INFINITY, ..base };
        assert!(matches!(sim.validate(), Err(Error::Invalid { field: "min_price", .. })));
    }
}
