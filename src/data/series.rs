//! Series loader: source selection, annual extension, and gain derivation.
//!
//! The loader produces a date-sorted, de-duplicated monthly series and the
//! `Observation`s derived from it:
//! FRED or local CSV -> optional 1919-1938 extension -> persist -> first differences

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Months, NaiveDate};
use tracing::{debug, info, warn};

use crate::data::fred::{FredClient, default_start};
use crate::domain::{
    AnnualExtension, DataSource, EndDate, Observation, PAYEMS, RunConfig, SeriesPoint, months_between,
};
use crate::error::AppError;
use crate::io::export::write_series_csv;
use crate::io::ingest::{find_latest_local, read_series_file};
use crate::math::CubicSpline;

/// Everything the rest of the pipeline needs from the loader.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub requested_end: EndDate,
    /// Date of the last observation actually available.
    pub end_date: NaiveDate,
    pub points: Vec<SeriesPoint>,
    pub observations: Vec<Observation>,
    /// Rows dropped as missing or malformed.
    pub dropped_rows: usize,
    /// Months filled by cubic interpolation.
    pub interpolated: usize,
    /// Files written while loading.
    pub saved: Vec<PathBuf>,
}

impl LoadedSeries {
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }
}

/// Load the series described by `config`, persisting what was loaded.
pub fn load_series(config: &RunConfig) -> Result<LoadedSeries, AppError> {
    let mut saved = Vec::new();
    let mut dropped_rows = 0usize;

    let primary = match config.source {
        DataSource::Fred => {
            let end = match config.end_date {
                EndDate::Latest => None,
                EndDate::On(date) => Some(date),
            };
            let points = FredClient::from_env()?.fetch_series(PAYEMS, default_start(), end)?;
            let last = last_date(&points)?;
            let path = config.dirs.series_csv(last);
            write_series_csv(&path, &points)?;
            info!(path = %path.display(), "saved downloaded series");
            saved.push(path);
            points
        }
        DataSource::Local => {
            let path = match config.end_date {
                EndDate::On(date) => config.dirs.series_csv(date),
                EndDate::Latest => find_latest_local(&config.dirs.data_dir)?
                    .map(|(_, path)| path)
                    .ok_or_else(|| {
                        AppError::config(format!(
                            "No usempl_YYYY-MM-DD.csv file found in '{}'.",
                            config.dirs.data_dir.display()
                        ))
                    })?,
            };
            info!(path = %path.display(), "reading local series");
            let ingest = read_series_file(&path)?;
            dropped_rows += ingest.row_errors.len();
            ingest.points
        }
    };

    let end_date = last_date(&primary)?;

    let (points, interpolated) = match &config.annual {
        Some(ext) => {
            let annual = read_series_file(&ext.path)?;
            dropped_rows += annual.row_errors.len();
            let merged = merge_series(&primary, &annual.points);
            let (extended, filled) = extend_with_annual(&merged, ext)?;

            let path = config.dirs.merged_csv(end_date);
            write_series_csv(&path, &extended)?;
            info!(path = %path.display(), filled, "saved merged series");
            saved.push(path);
            (extended, filled)
        }
        None => (merge_series(&primary, &[]), 0),
    };

    let gaps = interior_gaps(&points);
    if gaps > 0 {
        warn!(gaps, "series has missing interior months; gains span the gaps");
    }

    let observations = compute_gains(&points);
    debug!(n = observations.len(), %end_date, "observations ready");

    Ok(LoadedSeries {
        requested_end: config.end_date,
        end_date,
        points,
        observations,
        dropped_rows,
        interpolated,
        saved,
    })
}

/// Merge two series into one sorted by date with unique months.
///
/// `primary` wins when both carry the same month.
pub fn merge_series(primary: &[SeriesPoint], extension: &[SeriesPoint]) -> Vec<SeriesPoint> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for p in extension.iter().chain(primary) {
        by_date.insert(p.date, p.level);
    }
    by_date
        .into_iter()
        .map(|(date, level)| SeriesPoint::new(date, level))
        .collect()
}

/// Fill missing months inside `ext`'s window by cubic interpolation.
///
/// Knots are every known point dated up to `ext.anchor_end()`. Months outside
/// the knot range are left missing. Returns the extended series and the
/// number of months filled.
pub fn extend_with_annual(
    points: &[SeriesPoint],
    ext: &AnnualExtension,
) -> Result<(Vec<SeriesPoint>, usize), AppError> {
    let anchor_end = ext.anchor_end();
    let knots: Vec<(f64, f64)> = points
        .iter()
        .filter(|p| p.date <= anchor_end)
        .map(|p| (months_between(ext.start, p.date) as f64, p.level))
        .collect();

    let spline = CubicSpline::fit(&knots)
        .map_err(|e| AppError::no_data(format!("Cannot interpolate annual extension: {e}")))?;

    let mut by_date: BTreeMap<NaiveDate, f64> = points.iter().map(|p| (p.date, p.level)).collect();
    let mut filled = 0usize;
    let mut month = ext.start;
    while month <= ext.end {
        if !by_date.contains_key(&month) {
            if let Some(level) = spline.eval(months_between(ext.start, month) as f64) {
                by_date.insert(month, level);
                filled += 1;
            }
        }
        month = match month.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => break,
        };
    }

    let out = by_date
        .into_iter()
        .map(|(date, level)| SeriesPoint::new(date, level))
        .collect();
    Ok((out, filled))
}

/// First differences; the first observation has no gain.
pub fn compute_gains(points: &[SeriesPoint]) -> Vec<Observation> {
    let mut out = Vec::with_capacity(points.len());
    let mut prev: Option<f64> = None;
    for p in points {
        out.push(Observation {
            date: p.date,
            level: p.level,
            gain: prev.map(|level| p.level - level),
        });
        prev = Some(p.level);
    }
    out
}

/// Number of consecutive pairs more than one month apart.
pub fn interior_gaps(points: &[SeriesPoint]) -> usize {
    points
        .windows(2)
        .filter(|w| months_between(w[0].date, w[1].date) > 1)
        .count()
}

fn last_date(points: &[SeriesPoint]) -> Result<NaiveDate, AppError> {
    points
        .iter()
        .map(|p| p.date)
        .max()
        .ok_or_else(|| AppError::no_data("No valid observations in the employment series."))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::domain::{ChartStyle, OutputDirs};

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn monthly(start: NaiveDate, levels: &[f64]) -> Vec<SeriesPoint> {
        levels
            .iter()
            .enumerate()
            .map(|(i, &l)| SeriesPoint::new(start.checked_add_months(Months::new(i as u32)).unwrap(), l))
            .collect()
    }

    fn local_config(dirs: OutputDirs, end: EndDate, annual: Option<AnnualExtension>) -> RunConfig {
        RunConfig {
            end_date: end,
            source: DataSource::Local,
            annual,
            dirs,
            style: ChartStyle::default(),
            show: false,
            svg: false,
            ascii: false,
            ascii_width: 80,
            ascii_height: 20,
            export_streaks: None,
        }
    }

    #[test]
    fn gains_are_first_differences() {
        let obs = compute_gains(&monthly(d(2020, 1), &[100.0, 105.0, 103.0]));
        assert_eq!(obs[0].gain, None);
        assert_eq!(obs[1].gain, Some(5.0));
        assert_eq!(obs[2].gain, Some(-2.0));
        assert!(compute_gains(&[]).is_empty());
    }

    #[test]
    fn merge_sorts_dedups_and_prefers_primary() {
        let primary = vec![SeriesPoint::new(d(1939, 2), 2.0), SeriesPoint::new(d(1939, 1), 1.0)];
        let extension = vec![SeriesPoint::new(d(1939, 1), 99.0), SeriesPoint::new(d(1938, 7), 0.5)];
        let merged = merge_series(&primary, &extension);
        assert_eq!(
            merged,
            vec![
                SeriesPoint::new(d(1938, 7), 0.5),
                SeriesPoint::new(d(1939, 1), 1.0),
                SeriesPoint::new(d(1939, 2), 2.0),
            ]
        );
    }

    #[test]
    fn extension_fills_only_interior_months_of_the_window() {
        let ext = AnnualExtension {
            path: PathBuf::new(),
            start: d(1919, 1),
            end: d(1921, 12),
            lookahead_months: 3,
        };
        // Annual anchors on July 1 plus the first monthly observations after the window.
        let mut points = vec![
            SeriesPoint::new(d(1919, 7), 100.0),
            SeriesPoint::new(d(1920, 7), 110.0),
            SeriesPoint::new(d(1921, 7), 105.0),
        ];
        points.extend(monthly(d(1922, 1), &[108.0, 109.0, 110.0, 111.0, 112.0]));

        let (extended, filled) = extend_with_annual(&points, &ext).unwrap();

        // Jan-Jun 1919 precede the first anchor; Jul 1919-Dec 1921 are complete.
        assert_eq!(filled, 30 - 3);
        assert_eq!(extended.first().unwrap().date, d(1919, 7));
        assert_eq!(interior_gaps(&extended), 0);
        assert_eq!(extended.len(), 30 + 5);

        // Anchors are untouched and monthly data after the window is kept as-is.
        let at = |date| extended.iter().find(|p| p.date == date).unwrap().level;
        assert_eq!(at(d(1920, 7)), 110.0);
        assert_eq!(at(d(1922, 5)), 112.0);
    }

    #[test]
    fn extension_without_anchors_fails() {
        let ext = AnnualExtension::from_1919(PathBuf::new());
        let points = monthly(d(1939, 1), &[1.0, 2.0]);
        // Only 1939-01..1939-03 fall before the anchor end, so only two knots exist:
        // that is still enough for a straight line, but the window gets nothing.
        let (extended, filled) = extend_with_annual(&points, &ext).unwrap();
        assert_eq!(filled, 0);
        assert_eq!(extended, points);

        let err = extend_with_annual(&monthly(d(1950, 1), &[1.0]), &ext).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_NO_DATA);
    }

    #[test]
    fn interior_gaps_are_counted() {
        let points = vec![
            SeriesPoint::new(d(2020, 1), 1.0),
            SeriesPoint::new(d(2020, 2), 1.0),
            SeriesPoint::new(d(2020, 5), 1.0),
        ];
        assert_eq!(interior_gaps(&points), 1);
    }

    #[test]
    fn loads_local_series_with_annual_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = OutputDirs::new(tmp.path().join("data"), tmp.path().join("images"));
        dirs.ensure().unwrap();

        fs::write(
            dirs.data_dir.join("usempl_1939-06-01.csv"),
            "Date,PAYEMS\n\
             1939-01-01,29923\n\
             1939-02-01,30100\n\
             1939-03-01,.\n\
             1939-04-01,30094\n\
             1939-05-01,30299\n\
             1939-06-01,30502\n",
        )
        .unwrap();
        let annual_path = dirs.default_annual_file();
        let mut annual = String::from("Date,PAYEMS\n");
        for (i, level) in [27_000.0, 27_300.0, 24_200.0, 25_600.0].iter().enumerate() {
            annual.push_str(&format!("{}-07-01,{level}\n", 1935 + i));
        }
        fs::write(&annual_path, annual).unwrap();

        let ext = AnnualExtension {
            path: annual_path,
            start: d(1935, 1),
            end: d(1938, 12),
            lookahead_months: 3,
        };
        let config = local_config(dirs.clone(), EndDate::Latest, Some(ext));
        let loaded = load_series(&config).unwrap();

        assert_eq!(loaded.end_date, d(1939, 6));
        assert_eq!(loaded.dropped_rows, 1);
        assert_eq!(loaded.start_date(), Some(d(1935, 7)));
        // Aug 1935 through Dec 1938 minus the three July anchors.
        assert_eq!(loaded.interpolated, 41 - 3);
        assert_eq!(loaded.observations.len(), loaded.points.len());
        assert_eq!(loaded.observations[0].gain, None);
        assert!(dirs.merged_csv(d(1939, 6)).exists());
        assert_eq!(loaded.saved, vec![dirs.merged_csv(d(1939, 6))]);
    }

    #[test]
    fn missing_local_series_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = OutputDirs::new(tmp.path(), tmp.path());

        let err = load_series(&local_config(dirs.clone(), EndDate::Latest, None)).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);

        let err = load_series(&local_config(dirs, EndDate::On(d(2024, 2)), None)).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }

    #[test]
    fn local_series_with_only_bad_rows_has_no_data() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = OutputDirs::new(tmp.path(), tmp.path());
        fs::write(dirs.series_csv(d(2024, 2)), "Date,PAYEMS\n2024-01-01,.\n").unwrap();

        let err = load_series(&local_config(dirs, EndDate::On(d(2024, 2)), None)).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_NO_DATA);
    }
}
