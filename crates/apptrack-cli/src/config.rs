//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use apptrack_core::{AppId, TrackerConfig};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the usage log CSV.
    pub log_path: PathBuf,

    /// JSONL event stream appended by an external collector.
    pub events_path: Option<PathBuf>,

    /// App ID of the tracker itself, closed on pause.
    pub self_app: Option<String>,

    /// Sampling and session-threshold knobs.
    pub tracker: TrackerConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("log_path", &self.log_path)
            .field("events_path", &self.events_path)
            .field("self_app", &self.self_app)
            .field("tracker", &self.tracker)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            log_path: data_dir.join("usage_log.csv"),
            events_path: None,
            self_app: None,
            tracker: TrackerConfig::default(),
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

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (APPTRACK_*)
        figment = figment.merge(Env::prefixed("APPTRACK_"));

        figment.extract()
    }

    /// The configured self app ID, validated.
    pub fn self_app_id(&self) -> Option<AppId> {
        self.self_app
            .as_deref()
            .and_then(|id| AppId::new(id).ok())
    }
}

/// Returns the platform-specific config directory for apptrack.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("apptrack"))
}

/// Returns the platform-specific data directory for apptrack.
///
/// On Linux: `~/.local/share/apptrack`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("apptrack"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_returns_some() {
        assert!(dirs_data_path().is_some());
    }

    #[test]
    fn test_dirs_data_path_ends_with_apptrack() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "apptrack");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_log() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.log_path, data_dir.join("usage_log.csv"));
    }

    #[test]
    fn test_default_tracker_knobs() {
        let config = Config::default();
        assert_eq!(config.tracker.sample_window_ms, 5_000);
        assert_eq!(config.tracker.min_session_ms, 1_000);
    }

    #[test]
    fn test_self_app_id_rejects_empty() {
        let config = Config {
            self_app: Some(String::new()),
            ..Config::default()
        };
        assert!(config.self_app_id().is_none());
    }
}
