//! CLI output formatting.

use std::io::{self, Write};
use std::time::Duration;

use sheetcalc_orchestration::RunReport;

/// Format a duration for display.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 0.001 {
        format!("{:.2}µs", secs * 1_000_000.0)
    } else if secs < 1.0 {
        format!("{:.2}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.3}s")
    } else {
        let mins = (secs / 60.0).floor() as u64;
        let remaining = secs - (mins as f64 * 60.0);
        format!("{mins}m{remaining:.1}s")
    }
}

/// Format a modifier with an explicit sign, sheet-style.
#[must_use]
pub fn format_modifier(modifier: i64) -> String {
    format!("{modifier:+}")
}

/// Write a report to a file as pretty-printed JSON (flattened map shape with
/// the reserved metadata entry).
///
/// # Errors
///
/// Returns an I/O error if the file cannot be created or written.
pub fn write_report(path: &str, report: &RunReport) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    let value = report.to_value();
    serde_json::to_writer_pretty(&mut file, &value)?;
    writeln!(file)?;
    Ok(())
}
