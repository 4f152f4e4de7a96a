//! Event source backed by a JSONL file appended by an external collector.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Seek, SeekFrom};
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use apptrack_core::{AppId, EventSource, TransitionKind, UsageEvent};

/// Tails a JSONL file of [`UsageEvent`]s, one JSON object per line.
///
/// Whatever collects foreground transitions (an adb bridge, a compositor
/// hook, a test script) appends lines; each poll returns the events
/// appended since the previous poll. An appended file is ordered by
/// arrival, so the poll window is not re-applied here — late-arriving
/// events are delivered rather than dropped. An incomplete trailing line
/// (writer mid-append) is left for the next poll, and malformed lines are
/// skipped.
#[derive(Debug)]
pub struct JsonlEventSource {
    path: PathBuf,
    offset: u64,
    last_foreground: Option<AppId>,
}

impl JsonlEventSource {
    /// Creates a source tailing `path`. The file does not need to exist
    /// yet; polls return nothing until it does.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
            last_foreground: None,
        }
    }

    fn read_new_events(&mut self) -> Vec<UsageEvent> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::trace!(path = %self.path.display(), "event file not present yet");
                return Vec::new();
            }
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "failed to open event file");
                return Vec::new();
            }
        };

        // A shrunken file means rotation or truncation; start over.
        let len = file.metadata().map(|m| m.len()).unwrap_or(0);
        if len < self.offset {
            tracing::debug!(path = %self.path.display(), "event file truncated, rereading");
            self.offset = 0;
        }

        let mut reader = BufReader::new(file);
        if let Err(error) = reader.seek(SeekFrom::Start(self.offset)) {
            tracing::warn!(%error, "failed to seek event file");
            return Vec::new();
        }

        let mut events = Vec::new();
        let mut line = String::new();
        loop {
            line.clear();
            let read = match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(read) => read,
                Err(error) => {
                    tracing::warn!(%error, "failed to read event file");
                    break;
                }
            };
            if !line.ends_with('\n') {
                // Writer is mid-append; pick the line up next poll.
                break;
            }
            self.offset += read as u64;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<UsageEvent>(trimmed) {
                Ok(event) => {
                    if event.kind == TransitionKind::Resumed {
                        self.last_foreground = Some(event.app.clone());
                    }
                    events.push(event);
                }
                Err(error) => {
                    tracing::trace!(%error, "skipping malformed event line");
                }
            }
        }
        events
    }
}

impl EventSource for JsonlEventSource {
    fn events_between(&mut self, _from: DateTime<Utc>, _to: DateTime<Utc>) -> Vec<UsageEvent> {
        self.read_new_events()
    }

    fn most_recent_foreground(&mut self) -> Option<AppId> {
        self.last_foreground.clone()
    }
}
