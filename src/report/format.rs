//! Formatted terminal output for a run.
//!
//! Formatting lives here so the loader and segmenter stay free of
//! presentation code.

use crate::data::LoadedSeries;
use crate::domain::{Streak, StreakCollection, month_label};

/// Format the run summary (series span + streak highlights).
pub fn format_run_summary(series: &LoadedSeries, collection: &StreakCollection) -> String {
    let mut out = String::new();

    out.push_str("=== usempl - US employment gain streaks (PAYEMS) ===\n");
    out.push_str(&format!("Requested end: {}\n", series.requested_end));
    match series.start_date() {
        Some(start) => out.push_str(&format!(
            "Series: {} to {} | n={}\n",
            month_label(start),
            month_label(series.end_date),
            series.points.len()
        )),
        None => out.push_str("Series: empty\n"),
    }
    if series.interpolated > 0 {
        out.push_str(&format!("Interpolated months: {}\n", series.interpolated));
    }
    if series.dropped_rows > 0 {
        out.push_str(&format!("Dropped rows: {}\n", series.dropped_rows));
    }

    out.push_str(&format!("\nStreaks: {}\n", collection.len()));
    if let Some(s) = collection.longest() {
        out.push_str(&format!("Longest : {}\n", describe(s)));
    }
    if let Some(s) = collection.largest() {
        out.push_str(&format!("Largest : {}\n", describe(s)));
    }
    if let Some(s) = collection.current() {
        out.push_str(&format!("Current : {}\n", describe(s)));
    }
    if let Some(ext) = &collection.extrema {
        out.push_str(&format!(
            "Ranges  : months=[{}, {}] | cumulative=[{}, {}] | monthly=[{}, {}]\n",
            ext.length.min,
            ext.length.max,
            fmt_thousands(ext.cumulative_gain.min),
            fmt_thousands(ext.cumulative_gain.max),
            fmt_thousands(ext.monthly_gain.min),
            fmt_thousands(ext.monthly_gain.max),
        ));
    }

    out
}

/// Format the top-N streaks by length as a table.
pub fn format_streak_table(collection: &StreakCollection, top_n: usize) -> String {
    let mut rows: Vec<&Streak> = collection.streaks.iter().collect();
    rows.sort_by(|a, b| b.length.cmp(&a.length).then(a.start.cmp(&b.start)));

    let mut out = String::new();
    out.push_str(&format!(
        "{:<20} {:>7} {:>12} {:>10}\n",
        "streak", "months", "cumulative", "avg/month"
    ));
    out.push_str(&format!("{:-<20} {:->7} {:->12} {:->10}\n", "", "", "", ""));
    for s in rows.into_iter().take(top_n) {
        out.push_str(&format!(
            "{:<20} {:>7} {:>12} {:>10}\n",
            s.label(),
            s.length,
            fmt_thousands(s.cumulative_gain),
            fmt_thousands(s.average_gain),
        ));
    }
    out
}

fn describe(s: &Streak) -> String {
    format!(
        "{} ({} months, +{} cumulative, +{}/month)",
        s.label(),
        s.length,
        fmt_thousands(s.cumulative_gain),
        fmt_thousands(s.average_gain)
    )
}

/// Round to a whole number and group digits, e.g. `22051.6` -> `22,052`.
pub fn fmt_thousands(v: f64) -> String {
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
