//! Daemon configuration
//!
//! Read from `config.json` in the platform config directory
//! (`~/.config/inputroute/` on Linux). A missing default file means
//! defaults; a file named with `--config` must exist.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use inputroute_core::StatusText;
use inputroute_pulse::{DEFAULT_HEADSET_PROFILES, DEFAULT_PACTL};
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "inputroute";
const APP_NAME: &str = "inputroute";
const CONFIG_FILE: &str = "config.json";

/// Environment variable holding a `tracing` filter directive
pub const LOG_ENV: &str = "INPUTROUTE_LOG";

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Default log filter, overridden by `INPUTROUTE_LOG`
    pub log_level: Option<String>,
    /// Title of the status shown while a preference is applied
    pub status_title: String,
    /// Bluetooth headset profiles, most preferred first
    pub bluetooth_profiles: Vec<String>,
    pub pactl_path: PathBuf,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            status_title: StatusText::DEFAULT_TITLE.to_string(),
            bluetooth_profiles: DEFAULT_HEADSET_PROFILES.iter().map(|p| p.to_string()).collect(),
            pactl_path: PathBuf::from(DEFAULT_PACTL),
        }
    }
}

impl DaemonConfig {
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str(contents)
    }

    /// Log filter used when `INPUTROUTE_LOG` is unset.
    pub fn default_log_filter(&self) -> &str {
        match &self.log_level {
            Some(level) => level.as_str(),
            None if cfg!(debug_assertions) => "debug",
            None => "info",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = DaemonConfig::from_json(r#"{"status_title": "Mic Router"}"#).unwrap();

        assert_eq!(config.status_title, "Mic Router");
        assert_eq!(config.pactl_path, PathBuf::from("pactl"));
        assert_eq!(config.bluetooth_profiles, DaemonConfig::default().bluetooth_profiles);
    }

    #[test]
    fn test_log_level_override() {
        let config = DaemonConfig::from_json(r#"{"log_level": "inputroute_core=trace"}"#).unwrap();
        assert_eq!(config.default_log_filter(), "inputroute_core=trace");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("inputroute-missing-config.json");
        let _ = fs::remove_file(&path);

        let err = DaemonConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_explicit_file() {
        let path = std::env::temp_dir().join(format!("inputroute-config-{}.json", std::process::id()));
        fs::write(&path, r#"{"bluetooth_profiles": ["headset_head_unit"]}"#).unwrap();

        let config = DaemonConfig::load(Some(&path)).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.bluetooth_profiles, vec!["headset_head_unit".to_string()]);
        assert_eq!(config.status_title, StatusText::DEFAULT_TITLE);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("inputroute-bad-{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();

        let result = DaemonConfig::load(Some(&path));
        let _ = fs::remove_file(&path);

        assert!(result.is_err());
    }
}
