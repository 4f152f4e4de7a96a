//! Tracker configuration.

use std::collections::HashSet;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::AppId;

/// Configuration for session tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Width of the event query window, which is also the sampling period.
    /// Default: 5000 (5 seconds). Matching window and period means no event
    /// is double-counted and no gap exists between cycles.
    pub sample_window_ms: i64,

    /// Sessions at or below this duration are discarded as noise.
    /// Default: 1000 (1 second).
    pub min_session_ms: i64,

    /// App IDs that are never tracked (home screen, system UI). Injectable
    /// so the set can be adjusted per platform/device.
    pub system_packages: HashSet<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            sample_window_ms: 5_000,
            min_session_ms: 1_000,
            system_packages: [
                "com.android.systemui",
                "com.android.launcher",
                "com.google.android.apps.nexuslauncher",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl TrackerConfig {
    /// Whether the app is in the exclusion set.
    pub fn is_system(&self, app: &AppId) -> bool {
        self.system_packages.contains(app.as_str())
    }

    /// The query window as a duration.
    pub fn sample_window(&self) -> Duration {
        Duration::milliseconds(self.sample_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_excludes_system_ui() {
        let config = TrackerConfig::default();
        let system = AppId::new("com.android.systemui").unwrap();
        let user = AppId::new("com.example.mail").unwrap();
        assert!(config.is_system(&system));
        assert!(!config.is_system(&user));
    }

    #[test]
    fn default_window_matches_period() {
        let config = TrackerConfig::default();
        assert_eq!(config.sample_window(), Duration::seconds(5));
    }

    #[test]
    fn exclusion_set_is_injectable() {
        let config = TrackerConfig {
            system_packages: HashSet::from(["org.kde.plasmashell".to_string()]),
            ..TrackerConfig::default()
        };
        assert!(config.is_system(&AppId::new("org.kde.plasmashell").unwrap()));
        assert!(!config.is_system(&AppId::new("com.android.systemui").unwrap()));
    }
}
