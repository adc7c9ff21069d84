//! Delivery report rendering and the run log.
//!
//! Rendering is pure: outcomes in, text out, nothing filtered or
//! reordered. The same inputs always produce the same report, which is
//! what makes the log diffable between runs.

use crate::dispatch::RecipientOutcome;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timing for one recipient's dispatch pass.
#[derive(Debug, Clone)]
pub struct RecipientTiming {
    pub name: String,
    pub elapsed: Duration,
}

/// Everything the renderer needs, collected over one run.
pub struct DeliveryReport<'a> {
    pub timestamp: DateTime<Local>,
    /// `YYYYMMDD` label in dated mode, absent in flat mode
    pub date_label: Option<&'a str>,
    pub outcomes: &'a [RecipientOutcome],
    pub timings: &'a [RecipientTiming],
    pub total_elapsed: Duration,
}

/// Render the multi-section delivery report.
///
/// Sections: header with the run timestamp, run totals, per-recipient
/// timings, per-recipient sent/failed breakdown, trailing summary line.
/// The summary counts are sums over the outcome lists, never tracked
/// separately.
pub fn render(report: &DeliveryReport) -> String {
    let rule = "=".repeat(60);
    let total_sent: usize = report.outcomes.iter().map(|o| o.sent.len()).sum();
    let total_failed: usize = report.outcomes.iter().map(|o| o.failed.len()).sum();
    let total_secs = report.total_elapsed.as_secs_f64();

    let mut lines = Vec::new();
    lines.push(format!(
        "REPORT DELIVERY - {}",
        report.timestamp.format("%Y-%m-%d %H:%M:%S")
    ));
    lines.push(rule.clone());
    if let Some(date) = report.date_label {
        lines.push(format!("Date processed  : {date}"));
    }
    lines.push(format!("Folders scanned : {}", report.outcomes.len()));
    lines.push(format!(
        "Files sent      : {total_sent} | Failed: {total_failed}"
    ));
    lines.push(format!("Total time      : {total_secs:.2} seconds"));
    lines.push(rule.clone());
    lines.push(String::new());

    for timing in report.timings {
        lines.push(format!(
            "  {:<30}: {:.2} sec",
            timing.name,
            timing.elapsed.as_secs_f64()
        ));
    }
    lines.push(String::new());

    for outcome in report.outcomes {
        lines.push(format!("- {} (ID: {})", outcome.name, outcome.chat_id));
        if !outcome.sent.is_empty() {
            lines.push(format!("   Sent ({}):", outcome.sent.len()));
            for name in &outcome.sent {
                lines.push(format!("      - {name}"));
            }
        }
        if !outcome.failed.is_empty() {
            lines.push(format!("   Failed ({}):", outcome.failed.len()));
            for file in &outcome.failed {
                lines.push(format!("      - {} -> {}", file.name, file.error));
            }
        }
        lines.push(String::new());
    }

    lines.push(rule);
    lines.push(format!(
        "SUMMARY: {total_sent} sent | {total_failed} failed | {total_secs:.2}s total"
    ));
    lines.join("\n")
}

/// Write the rendered report to `LOG_<YYYYMMDD_HHMMSS>.txt` in the base
/// directory. One file per run; never appended, never rotated.
pub fn write_log(base: &Path, timestamp: &DateTime<Local>, text: &str) -> Result<PathBuf> {
    let path = base.join(format!("LOG_{}.txt", timestamp.format("%Y%m%d_%H%M%S")));
    std::fs::write(&path, text)
        .with_context(|| format!("could not write log {}", path.display()))?;
    Ok(path)
}
