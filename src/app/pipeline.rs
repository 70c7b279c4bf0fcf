//! The streak pipeline shared by every front-end:
//! load series -> segment streaks -> render charts -> optional exports.
//!
//! Printing is left to the caller.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::info;

use crate::data::{LoadedSeries, load_series};
use crate::domain::{RunConfig, StreakCollection};
use crate::error::AppError;
use crate::io::export::write_streaks_csv;
use crate::render::html::ChartMeta;
use crate::render::{write_streaks_html, write_streaks_svg};
use crate::streaks::segment;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub series: LoadedSeries,
    pub streaks: StreakCollection,
    pub chart_path: PathBuf,
    pub svg_path: Option<PathBuf>,
    pub streaks_csv: Option<PathBuf>,
}

/// Execute the full pipeline. `updated` is the date printed in the chart's source note.
pub fn run_pipeline(config: &RunConfig, updated: NaiveDate) -> Result<RunOutput, AppError> {
    // 1) Load (and persist) the series.
    let series = load_series(config)?;

    // 2) Segment into streaks.
    let streaks = segment(&series.observations);
    info!(
        streaks = streaks.len(),
        open = streaks.current().is_some(),
        "segmented employment gain streaks"
    );

    // 3) Charts.
    let meta = ChartMeta {
        series_start: series.start_date().unwrap_or(series.end_date),
        updated,
    };
    let chart_path = config.dirs.chart_html(series.end_date);
    write_streaks_html(&chart_path, &streaks, &meta, &config.style)?;
    info!(path = %chart_path.display(), "wrote interactive chart");

    let svg_path = if config.svg {
        let path = config.dirs.chart_svg(series.end_date);
        write_streaks_svg(&path, &streaks, &meta, &config.style)?;
        info!(path = %path.display(), "wrote static chart");
        Some(path)
    } else {
        None
    };

    // 4) Optional per-month export.
    if let Some(path) = &config.export_streaks {
        write_streaks_csv(path, &streaks)?;
        info!(path = %path.display(), "exported streak months");
    }

    Ok(RunOutput {
        series,
        streaks,
        chart_path,
        svg_path,
        streaks_csv: config.export_streaks.clone(),
    })
}
