//! Shared domain types.
//!
//! Series and streak records are built append-only and never mutated after
//! construction. They are serializable so the renderers can embed them as
//! chart payloads without an intermediate copy.

use std::fs::create_dir_all;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::error::AppError;

/// FRED series id for US total nonfarm payroll employment.
pub const PAYEMS: &str = "PAYEMS";

/// One `(month, level)` value of the employment series (level in thousands).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub level: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, level: f64) -> Self {
        Self { date, level }
    }
}

/// A series point annotated with its month-over-month gain.
///
/// `gain` is `None` for the first observation of the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub level: f64,
    pub gain: Option<f64>,
}

/// One month inside a streak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StreakPoint {
    pub date: NaiveDate,
    pub level: f64,
    pub gain: f64,
    /// 1-based position of this month inside its streak.
    pub month_in_streak: usize,
    /// Running sum of gains up to and including this month.
    pub cumulative_gain: f64,
}

/// A maximal run of consecutive months with strictly positive gain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Streak {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub points: Vec<StreakPoint>,
    pub length: usize,
    pub cumulative_gain: f64,
    pub average_gain: f64,
    /// The series ended while this streak was still running.
    pub open: bool,
}

impl Streak {
    /// Legend label, e.g. `2010-10 to 2020-02`.
    pub fn label(&self) -> String {
        format!("{} to {}", month_label(self.start), month_label(self.end))
    }

    pub fn min_gain(&self) -> f64 {
        self.points.iter().map(|p| p.gain).fold(f64::INFINITY, f64::min)
    }

    pub fn max_gain(&self) -> f64 {
        self.points.iter().map(|p| p.gain).fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Inclusive `[min, max]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange<T> {
    pub min: T,
    pub max: T,
}

/// Global extrema across all streaks, used to scale a shared chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StreakExtrema {
    /// Range of per-streak cumulative gain totals.
    pub cumulative_gain: ValueRange<f64>,
    /// Range of per-streak lengths (months).
    pub length: ValueRange<usize>,
    /// Range of single-month gains across every streak member.
    pub monthly_gain: ValueRange<f64>,
}

/// Ordered streaks plus their global extrema (`None` when there are no streaks).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StreakCollection {
    pub streaks: Vec<Streak>,
    pub extrema: Option<StreakExtrema>,
}

impl StreakCollection {
    pub fn len(&self) -> usize {
        self.streaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streaks.is_empty()
    }

    /// Longest streak; the earliest one wins ties.
    pub fn longest(&self) -> Option<&Streak> {
        self.streaks
            .iter()
            .reduce(|best, s| if s.length > best.length { s } else { best })
    }

    /// Streak with the largest cumulative gain; the earliest one wins ties.
    pub fn largest(&self) -> Option<&Streak> {
        self.streaks.iter().reduce(|best, s| {
            if s.cumulative_gain > best.cumulative_gain {
                s
            } else {
                best
            }
        })
    }

    /// The trailing streak if the series ended while it was running.
    pub fn current(&self) -> Option<&Streak> {
        self.streaks.last().filter(|s| s.open)
    }
}

/// Requested end of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndDate {
    /// Whatever the source has most recently published.
    Latest,
    On(NaiveDate),
}

impl FromStr for EndDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") || s.eq_ignore_ascii_case("today") {
            return Ok(EndDate::Latest);
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(EndDate::On)
            .map_err(|e| format!("Invalid end date '{s}' (expected YYYY-MM-DD or 'latest'): {e}"))
    }
}

impl std::fmt::Display for EndDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndDate::Latest => write!(f, "latest"),
            EndDate::On(date) => write!(f, "{date}"),
        }
    }
}

/// Where the monthly series comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Download from FRED.
    Fred,
    /// Read a previously saved CSV from the data directory.
    Local,
}

/// Sparse annual data used to extend the series back before 1939.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnualExtension {
    pub path: PathBuf,
    /// First month to fill (inclusive).
    pub start: NaiveDate,
    /// Last month to fill (inclusive).
    pub end: NaiveDate,
    /// Monthly observations after `end` that also anchor the spline.
    pub lookahead_months: u32,
}

impl AnnualExtension {
    pub const DEFAULT_FILE: &'static str = "usempl_annual_1919-1938.csv";

    /// The 1919-1938 extension read from `path`.
    pub fn from_1919(path: PathBuf) -> Self {
        Self {
            path,
            start: ymd(1919, 1, 1),
            end: ymd(1938, 12, 1),
            lookahead_months: 3,
        }
    }

    /// Last date whose known value is used as a spline knot.
    pub fn anchor_end(&self) -> NaiveDate {
        self.end
            .checked_add_months(Months::new(self.lookahead_months))
            .unwrap_or(self.end)
    }
}

/// Directories for persisted data and rendered charts.
///
/// Created by the caller and passed explicitly to the loader and renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirs {
    pub data_dir: PathBuf,
    pub image_dir: PathBuf,
}

impl OutputDirs {
    pub fn new(data_dir: impl Into<PathBuf>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            image_dir: image_dir.into(),
        }
    }

    /// Create both directories (and parents) if they are missing.
    pub fn ensure(&self) -> Result<(), AppError> {
        for dir in [&self.data_dir, &self.image_dir] {
            create_dir_all(dir).map_err(|e| {
                AppError::config(format!("Failed to create directory '{}': {e}", dir.display()))
            })?;
        }
        Ok(())
    }

    pub fn series_csv(&self, end: NaiveDate) -> PathBuf {
        self.data_dir.join(format!("usempl_{end}.csv"))
    }

    pub fn merged_csv(&self, end: NaiveDate) -> PathBuf {
        self.data_dir.join(format!("usempl_{end}_merged.csv"))
    }

    pub fn chart_html(&self, end: NaiveDate) -> PathBuf {
        self.image_dir.join(format!("usempl_streaks_{end}.html"))
    }

    pub fn chart_svg(&self, end: NaiveDate) -> PathBuf {
        self.image_dir.join(format!("usempl_streaks_{end}.svg"))
    }

    pub fn default_annual_file(&self) -> PathBuf {
        self.data_dir.join(AnnualExtension::DEFAULT_FILE)
    }
}

/// Presentation parameters for the streak charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    /// Streaks with a total gain above this are highlighted.
    pub highlight_min_gain: f64,
    /// Streaks longer than this many months are highlighted.
    pub highlight_min_months: usize,
    /// Fractional padding applied to the axis ranges.
    pub range_buffer: f64,
    pub width_px: u32,
    pub height_px: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            highlight_min_gain: 10_000.0,
            highlight_min_months: 40,
            range_buffer: 0.05,
            width_px: 800,
            height_px: 500,
        }
    }
}

impl ChartStyle {
    pub fn is_highlighted(&self, streak: &Streak) -> bool {
        streak.cumulative_gain > self.highlight_min_gain || streak.length > self.highlight_min_months
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub end_date: EndDate,
    pub source: DataSource,
    pub annual: Option<AnnualExtension>,
    pub dirs: OutputDirs,
    pub style: ChartStyle,
    /// Open the HTML chart in a browser once written.
    pub show: bool,
    pub svg: bool,
    pub ascii: bool,
    pub ascii_width: usize,
    pub ascii_height: usize,
    pub export_streaks: Option<PathBuf>,
}

/// Truncate a date to the first day of its month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// `YYYY-MM` label for a month.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Whole months from `from` to `to` (negative when `to` is earlier).
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64)
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}
