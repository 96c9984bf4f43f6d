// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};
use std::path::Path;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, BotSettings, Settings, SimulationSettings, Timeframe};

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `config/base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `config/development.toml`).
/// 3. Merges settings from environment variables (e.g., `APP__BOT__SHORT_PERIOD=9`).
///
/// The merged result is validated before it is returned.
pub fn load_settings() -> Result<Settings> {
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = Config::builder()
        .add_source(File::with_name("config/base"))
        .add_source(File::with_name(&format!("config/{}", environment)).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    settings.validate()?;

    Ok(settings)
}

/// Loads a standalone bot profile (just the `BotSettings` table) from a TOML file.
pub fn load_bot_profile(path: impl AsRef<Path>) -> Result<BotSettings> {
    let content = std::fs::read_to_string(path)?;
    let bot: BotSettings = toml::from_str(&content)?;
    bot.validate()?;
    Ok(bot)
}
