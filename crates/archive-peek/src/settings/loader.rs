//! Settings loading from JSON files.
//!
//! Looks next to the executable first (portable installs keep `appsettings.json` there), then in
//! the per-user config directory. A missing or broken file is never fatal: we log and use defaults.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::Settings;

/// File name looked up next to the executable.
pub const SETTINGS_FILE_NAME: &str = "appsettings.json";

const CONFIG_DIR_NAME: &str = "archive-peek";
const USER_SETTINGS_FILE_NAME: &str = "settings.json";

/// Why a specific settings file couldn't be used.
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Couldn't read settings file: {}", e),
            Self::Parse(e) => write!(f, "Couldn't parse settings file: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Reads and parses one settings file.
pub fn load_settings_from(path: &Path) -> Result<Settings, SettingsError> {
    let contents = fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&contents)?;
    Ok(settings.normalized())
}

/// Candidate files in lookup order.
pub fn settings_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        candidates.push(dir.join(SETTINGS_FILE_NAME));
    }
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join(CONFIG_DIR_NAME).join(USER_SETTINGS_FILE_NAME));
    }
    candidates
}

/// Loads settings from `explicit` if given, else from the first existing candidate file.
/// Returns defaults if nothing usable is found.
pub fn load_settings(explicit: Option<&Path>) -> Settings {
    if let Some(path) = explicit {
        return match load_settings_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring settings file {}: {}", path.display(), e);
                Settings::default()
            }
        };
    }

    for candidate in settings_file_candidates() {
        if !candidate.is_file() {
            continue;
        }
        match load_settings_from(&candidate) {
            Ok(settings) => {
                debug!("Loaded settings from {}", candidate.display());
                return settings;
            }
            Err(e) => warn!("Ignoring settings file {}: {}", candidate.display(), e),
        }
    }

    Settings::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(&path, r#"{ "archiveToolPath": "/opt/7z/7zz", "cacheExpirationMinutes": 1 }"#).unwrap();

        let settings = load_settings(Some(&path));
        assert_eq!(settings.archive_tool_path.as_deref(), Some("/opt/7z/7zz"));
        assert_eq!(settings.cache_expiration_minutes, 1);
    }

    #[test]
    fn broken_explicit_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(load_settings_from(&path), Err(SettingsError::Parse(_))));
        assert_eq!(load_settings(Some(&path)), Settings::default());
    }

    #[test]
    fn missing_explicit_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_settings_from(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(SettingsError::Io(_))));
    }
}
