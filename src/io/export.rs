//! CSV exports: the loaded series and the per-month streak table.
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use crate::domain::{SeriesPoint, StreakCollection};
use crate::error::AppError;

/// Write a `Date,PAYEMS` series CSV (the format `ingest` reads back).
pub fn write_series_csv(path: &Path, points: &[SeriesPoint]) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;

    writer
        .write_record(["Date", "PAYEMS"])
        .map_err(|e| AppError::config(format!("Failed to write series CSV header: {e}")))?;

    for p in points {
        writer
            .write_record([p.date.to_string(), fmt_level(p.level)])
            .map_err(|e| AppError::config(format!("Failed to write series CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to flush series CSV '{}': {e}", path.display())))
}

/// Write one row per streak month, with the streak totals repeated per row.
pub fn write_streaks_csv(path: &Path, collection: &StreakCollection) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;

    writer
        .write_record([
            "streak",
            "date",
            "level",
            "gain",
            "month_in_streak",
            "cumulative_gain",
            "streak_months",
            "streak_cumulative_gain",
            "streak_avg_gain",
        ])
        .map_err(|e| AppError::config(format!("Failed to write streak CSV header: {e}")))?;

    for streak in &collection.streaks {
        let label = streak.label();
        for p in &streak.points {
            writer
                .write_record([
                    label.clone(),
                    p.date.to_string(),
                    fmt_level(p.level),
                    fmt_level(p.gain),
                    p.month_in_streak.to_string(),
                    fmt_level(p.cumulative_gain),
                    streak.length.to_string(),
                    fmt_level(streak.cumulative_gain),
                    format!("{:.4}", streak.average_gain),
                ])
                .map_err(|e| AppError::config(format!("Failed to write streak CSV row: {e}")))?;
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to flush streak CSV '{}': {e}", path.display())))
}

fn create_writer(path: &Path) -> Result<csv::Writer<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create CSV '{}': {e}", path.display())))?;
    Ok(csv::Writer::from_writer(file))
}

/// Shortest representation that reads back to the same value
/// (`29923`, `30512.123456789`).
fn fmt_level(v: f64) -> String {
    format!("{v}")
}
