//! Report command: per-app usage totals from a usage log.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use apptrack_log::LoggedRow;

/// Aggregated usage for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppTotal {
    pub app: String,
    pub sessions: usize,
    pub total_secs: i64,
}

/// Computed report data.
#[derive(Debug, Serialize)]
pub struct ReportData {
    /// Number of tracking runs summarized in the log.
    pub runs: usize,
    pub apps: Vec<AppTotal>,
}

/// Prints per-app totals for the given usage log.
pub fn run(log_path: &Path, json: bool) -> Result<()> {
    let rows = apptrack_log::read_rows(log_path)
        .with_context(|| format!("failed to read usage log {}", log_path.display()))?;
    let data = aggregate(&rows);

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if data.apps.is_empty() {
        println!("No sessions recorded in {}", log_path.display());
        return Ok(());
    }

    let width = data
        .apps
        .iter()
        .map(|t| t.app.len())
        .max()
        .unwrap_or(0)
        .max("APP".len());
    println!("{:<width$}  {:>8}  {:>10}", "APP", "SESSIONS", "TOTAL");
    for total in &data.apps {
        println!(
            "{:<width$}  {:>8}  {:>10}",
            total.app,
            total.sessions,
            format_duration(total.total_secs)
        );
    }
    println!("\n{} tracking run(s)", data.runs);
    Ok(())
}

/// Folds log rows into per-app totals, most-used first.
fn aggregate(rows: &[LoggedRow]) -> ReportData {
    let mut totals: HashMap<&str, AppTotal> = HashMap::new();
    let mut runs = 0;

    for row in rows {
        if row.is_summary() {
            runs += 1;
            continue;
        }
        let entry = totals.entry(&row.subject).or_insert_with(|| AppTotal {
            app: row.subject.clone(),
            sessions: 0,
            total_secs: 0,
        });
        entry.sessions += 1;
        entry.total_secs += row.duration_secs;
    }

    let mut apps: Vec<AppTotal> = totals.into_values().collect();
    apps.sort_by(|a, b| b.total_secs.cmp(&a.total_secs).then(a.app.cmp(&b.app)));
    ReportData { runs, apps }
}

/// Formats whole seconds as a duration string.
/// Returns "Xh Ym" above an hour, "Xm Ys" above a minute, "Xs" below.
/// Negative durations are treated as 0s (defensive).
fn format_duration(secs: i64) -> String {
    if secs < 0 {
        return "0s".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else if minutes >= 1 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
