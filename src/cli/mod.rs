//! Command-line parsing for the employment streak charts.
//!
//! Argument parsing stays separate from the loader and segmentation code; the
//! app layer turns `Cli` into a `RunConfig`.

use std::path::PathBuf;

use clap::Parser;

use crate::domain::EndDate;

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "usempl",
    version,
    about = "Consecutive US monthly employment gain streaks (FRED PAYEMS)"
)]
pub struct Cli {
    /// Last month of the series: YYYY-MM-DD, or `latest`.
    #[arg(short = 'e', long, default_value = "latest", value_parser = clap::value_parser!(EndDate))]
    pub end_date: EndDate,

    /// Read `usempl_<end-date>.csv` from the data directory instead of downloading from FRED.
    #[arg(long)]
    pub local: bool,

    /// Prepend 1919-1938 annual employment, filling months by cubic interpolation.
    #[arg(long = "annual-1919")]
    pub annual_1919: bool,

    /// Annual 1919-1938 CSV (defaults to `<data-dir>/usempl_annual_1919-1938.csv`).
    #[arg(long, value_name = "CSV")]
    pub annual_file: Option<PathBuf>,

    /// Open the chart in the default browser once written.
    #[arg(long)]
    pub show: bool,

    /// Directory for downloaded and merged series CSVs.
    #[arg(long, env = "USEMPL_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for rendered charts.
    #[arg(long, env = "USEMPL_IMAGE_DIR", default_value = "images")]
    pub image_dir: PathBuf,

    /// Highlight streaks whose cumulative gain exceeds this (thousands of jobs).
    #[arg(long, default_value_t = 10_000.0)]
    pub highlight_min_gain: f64,

    /// Highlight streaks longer than this many months.
    #[arg(long, default_value_t = 40)]
    pub highlight_min_months: usize,

    /// Also write a static SVG chart next to the HTML one.
    #[arg(long)]
    pub svg: bool,

    /// Print an ASCII overview of the streaks in the terminal.
    #[arg(long)]
    pub ascii: bool,

    /// ASCII plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// ASCII plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export every streak month to CSV.
    #[arg(long = "export-streaks", value_name = "CSV")]
    pub export_streaks: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace). `RUST_LOG` wins when set.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
