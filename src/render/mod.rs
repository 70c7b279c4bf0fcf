//! Chart renderers for the streak collection.
//!
//! - interactive HTML page (`html`)
//! - static SVG via Plotters (`svg`)
//! - best-effort browser launch (`open_in_browser`)
//!
//! All renderers share the same axis bounds, derived from the collection's
//! extrema, so the charts agree with each other.

use std::path::Path;
use std::process::Command;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::StreakExtrema;

pub mod html;
pub mod svg;

pub use html::write_streaks_html;
pub use svg::write_streaks_svg;

/// Bokeh's Viridis8, dark to light.
pub const VIRIDIS8: [&str; 8] = [
    "#440154", "#46327E", "#365C8D", "#277F8E", "#1FA187", "#4AC16D", "#A0DA39", "#FDE725",
];

/// Color for streaks below the highlight thresholds.
pub const OTHER_COLOR: &str = "#FFA500";

/// Color of the `rank`-th highlighted streak, starting from the light end.
pub fn highlight_color(rank: usize) -> &'static str {
    VIRIDIS8[VIRIDIS8.len() - 1 - (rank % VIRIDIS8.len())]
}

/// Shared axis bounds: x is months in streak, y is cumulative gain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl ChartBounds {
    /// Bounds for an empty chart.
    pub const EMPTY: ChartBounds = ChartBounds {
        x: (0.0, 12.0),
        y: (0.0, 1_000.0),
    };

    /// Pad the data range by `buffer` (a fraction) on both axes.
    pub fn from_extrema(extrema: Option<&StreakExtrema>, buffer: f64) -> Self {
        let Some(ext) = extrema else {
            return Self::EMPTY;
        };

        // Running cumulative gains start at each streak's first gain, so the
        // smallest single-month gain bounds them from below.
        let y_lo = ext.monthly_gain.min;
        let y_hi = ext.cumulative_gain.max;
        let y_pad = ((y_hi - y_lo) * buffer).max(1.0);

        let x_lo = 1.0;
        let x_hi = ext.length.max as f64;
        let x_pad = ((x_lo + x_hi) * buffer).max(0.5);

        Self {
            x: (x_lo - x_pad, x_hi + x_pad),
            y: (y_lo - y_pad, y_hi + y_pad),
        }
    }
}

/// Text used under the chart title, e.g. `updated February 2, 2024`.
pub fn updated_label(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!("{} {}, {}", date.format("%B"), date.day(), date.year())
}

/// Ask the OS to open `path` with its default handler.
///
/// Failure only produces a warning: the chart file is already written.
pub fn open_in_browser(path: &Path) {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };

    match cmd.arg(path).status() {
        Ok(status) if status.success() => debug!(path = %path.display(), "opened chart"),
        Ok(status) => warn!(path = %path.display(), %status, "chart viewer exited with an error"),
        Err(e) => warn!(path = %path.display(), "could not open chart: {e}"),
    }
}
