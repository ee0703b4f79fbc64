//! Configuration loading and management.

use std::path::{Path, PathBuf};

use circa_core::ValidationError;
use circa_core::sleep::{DEFAULT_IDEAL_SLEEP_MINUTES, SleepPreferences};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Default number of nights in the sleep-debt window.
pub const DEFAULT_DEBT_WINDOW_DAYS: usize = 7;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Ideal sleep used until preferences are stored.
    pub ideal_sleep_minutes: i64,
    /// Nights counted by the sleep-debt aggregate.
    pub debt_window_days: usize,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("circa.db"),
            ideal_sleep_minutes: DEFAULT_IDEAL_SLEEP_MINUTES,
            debt_window_days: DEFAULT_DEBT_WINDOW_DAYS,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // CIRCA_DATABASE_PATH, CIRCA_IDEAL_SLEEP_MINUTES, ...
        figment = figment.merge(Env::prefixed("CIRCA_"));

        figment.extract()
    }

    /// Preferences to fall back on when none are stored.
    pub fn default_preferences(&self) -> Result<SleepPreferences, ValidationError> {
        SleepPreferences::new(self.ideal_sleep_minutes)
    }
}

/// Returns the platform-specific config directory for circa.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("circa"))
}

/// Returns the platform-specific data directory for circa.
///
/// On Linux: `~/.local/share/circa`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("circa"))
}
