//! Application settings, stored at the platform config path.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::monitor::MonitorSettings;

const APP_NAME: &str = "keyrota";

/// Global start/stop hotkey combos, free-form text like `"ctrl+f11"`.
/// `None` means no binding.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeySettings {
    pub start_scheduler: Option<String>,
    pub stop_scheduler: Option<String>,
}

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Polling cadence of the scheduler loop, in milliseconds.
    pub tick_interval_ms: u64,

    /// How long `stop()` waits for the loop to acknowledge before
    /// returning with a warning.
    pub stop_join_timeout_ms: u64,

    pub hotkeys: HotkeySettings,

    pub monitor: MonitorSettings,

    /// Custom definitions directory; `None` uses the platform default.
    pub definitions_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            stop_join_timeout_ms: 2000,
            hotkeys: HotkeySettings::default(),
            monitor: MonitorSettings::default(),
            definitions_dir: None,
        }
    }
}

impl AppConfig {
    /// Load from the platform config path, falling back to defaults on
    /// any failure (first run, corrupted file).
    pub fn load() -> Self {
        confy::load(APP_NAME, None).unwrap_or_else(|err| {
            warn!(%err, "failed to load app config, using defaults");
            Self::default()
        })
    }

    pub fn save(&self) {
        if let Err(err) = confy::store(APP_NAME, None, self) {
            warn!(%err, "failed to save app config");
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn stop_join_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_join_timeout_ms)
    }

    /// Platform default for user definition files
    /// (e.g., `~/.config/keyrota/definitions`).
    pub fn default_definitions_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join("definitions"))
    }

    pub fn definitions_dir(&self) -> Option<PathBuf> {
        self.definitions_dir.clone().or_else(Self::default_definitions_dir)
    }
}
