//! User settings: the struct, its defaults, and where it's loaded from.

mod loader;

pub use loader::{SETTINGS_FILE_NAME, SettingsError, load_settings, load_settings_from, settings_file_candidates};

use serde::Deserialize;
use std::time::Duration;

const MIN_POLLING_INTERVAL_MS: u64 = 10;

/// Settings as stored in `appsettings.json` / `settings.json`.
/// Keys are camelCase; every field has a default so partial files work.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Explicit path to the 7-Zip executable. Empty means "search for it".
    pub archive_tool_path: Option<String>,
    pub cache_expiration_minutes: u64,
    /// How long "no capable tool" results stay cached. Kept short so installing 7-Zip is picked up.
    pub failed_listing_cache_seconds: u64,
    /// Cap on entries read from one archive.
    pub max_entries: usize,
    /// Cap on entries handed to the display surface.
    pub max_display_entries: usize,
    pub polling_interval_ms: u64,
    pub debounce_interval_ms: u64,
    pub enable_image_preview: bool,
    pub enable_tree_view: bool,
    pub show_statistics: bool,
    /// `env_logger` filter used when `RUST_LOG` isn't set.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            archive_tool_path: None,
            cache_expiration_minutes: 5,
            failed_listing_cache_seconds: 30,
            max_entries: 200,
            max_display_entries: 200,
            polling_interval_ms: 300,
            debounce_interval_ms: 150,
            enable_image_preview: true,
            enable_tree_view: false,
            show_statistics: true,
            log_level: String::from("info"),
        }
    }
}

impl Settings {
    /// Clamps values that would make the monitor spin or read nothing.
    pub fn normalized(mut self) -> Self {
        self.max_entries = self.max_entries.max(1);
        self.max_display_entries = self.max_display_entries.max(1);
        self.polling_interval_ms = self.polling_interval_ms.max(MIN_POLLING_INTERVAL_MS);
        if self.archive_tool_path.as_deref().is_some_and(|p| p.trim().is_empty()) {
            self.archive_tool_path = None;
        }
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_expiration_minutes.saturating_mul(60))
    }

    pub fn failed_listing_ttl(&self) -> Duration {
        Duration::from_secs(self.failed_listing_cache_seconds)
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }

    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_interval_ms)
    }
}
