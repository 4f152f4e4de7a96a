//! Foreground/background transition events.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::AppId;

/// The kind of foreground transition an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// The application moved to the foreground.
    Resumed,
    /// The application left the foreground.
    Paused,
}

impl TransitionKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Resumed => "resumed",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionKind {
    type Err = UnknownTransition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resumed" => Ok(Self::Resumed),
            "paused" => Ok(Self::Paused),
            _ => Err(UnknownTransition(s.to_string())),
        }
    }
}

impl Serialize for TransitionKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransitionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown transition kind strings.
#[derive(Debug, Clone)]
pub struct UnknownTransition(String);

impl fmt::Display for UnknownTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown transition kind: {}", self.0)
    }
}

impl std::error::Error for UnknownTransition {}

/// A timestamped foreground transition for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    /// The application the transition belongs to.
    pub app: AppId,
    /// When the transition occurred.
    pub timestamp: DateTime<Utc>,
    /// Whether the application entered or left the foreground.
    pub kind: TransitionKind,
}

impl UsageEvent {
    /// Creates a new event.
    pub const fn new(app: AppId, timestamp: DateTime<Utc>, kind: TransitionKind) -> Self {
        Self {
            app,
            timestamp,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_kinds() {
        for kind in [TransitionKind::Resumed, TransitionKind::Paused] {
            let s = kind.to_string();
            let parsed: TransitionKind = s.parse().expect("should parse");
            assert_eq!(parsed, kind, "roundtrip failed for {kind:?}");
        }
    }

    #[test]
    fn unknown_kind_errors() {
        let result: Result<TransitionKind, _> = "stopped".parse();
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "unknown transition kind: stopped");
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = UsageEvent::new(
            AppId::new("com.example.mail").unwrap(),
            Utc::now(),
            TransitionKind::Resumed,
        );

        let json = serde_json::to_string(&event).unwrap();
        let parsed: UsageEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, event);
    }

    #[test]
    fn event_rejects_empty_app() {
        let json = r#"{"app":"","timestamp":"2024-01-01T00:00:00Z","kind":"resumed"}"#;
        let result: Result<UsageEvent, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn kind_serde_matches_as_str() {
        for kind in [TransitionKind::Resumed, TransitionKind::Paused] {
            let value = serde_json::to_value(kind).unwrap();
            assert_eq!(value.as_str().unwrap(), kind.as_str());
        }
    }
}
