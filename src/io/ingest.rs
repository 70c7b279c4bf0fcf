//! CSV ingest for the employment series.
//!
//! Series files are two-column tables (`date,level`) with a single header row.
//! Column names are ignored: FRED has shipped both `DATE` and
//! `observation_date` over the years, and the annual table uses `Date`.
//!
//! Rows with a missing or unparseable value are dropped and reported as
//! `RowError`s; they never abort the load.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{SeriesPoint, month_start};
use crate::error::AppError;

/// Tokens treated as "no value" in a level column.
const NA_VALUES: [&str; 4] = [".", "na", "nan", "#n/a"];

/// A row dropped during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed points in file order plus dropped rows.
#[derive(Debug, Clone, Default)]
pub struct SeriesIngest {
    pub points: Vec<SeriesPoint>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Read a series CSV from disk.
pub fn read_series_file(path: &Path) -> Result<SeriesIngest, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open series CSV '{}': {e}", path.display())))?;
    let ingest = read_series_csv(file)?;

    debug!(
        path = %path.display(),
        rows = ingest.rows_read,
        kept = ingest.points.len(),
        "read series csv"
    );
    if !ingest.row_errors.is_empty() {
        warn!(
            path = %path.display(),
            dropped = ingest.row_errors.len(),
            "dropped malformed rows"
        );
    }
    Ok(ingest)
}

/// Parse a series CSV from any reader (file, HTTP body, test buffer).
pub fn read_series_csv<R: Read>(reader: R) -> Result<SeriesIngest, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    reader
        .headers()
        .map_err(|e| AppError::config(format!("Failed to read CSV headers: {e}")))?;

    let mut out = SeriesIngest::default();

    for (idx, result) in reader.records().enumerate() {
        // +2: one header line, 1-based line numbers.
        let line = idx + 2;
        out.rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_record(&record));

        match parsed {
            Ok(point) => out.points.push(point),
            Err(message) => out.row_errors.push(RowError { line, message }),
        }
    }

    Ok(out)
}

/// Find the newest `usempl_YYYY-MM-DD.csv` in `data_dir`.
pub fn find_latest_local(data_dir: &Path) -> Result<Option<(NaiveDate, PathBuf)>, AppError> {
    let entries = std::fs::read_dir(data_dir).map_err(|e| {
        AppError::config(format!("Failed to list data directory '{}': {e}", data_dir.display()))
    })?;

    let mut best: Option<(NaiveDate, PathBuf)> = None;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(date) = name.to_str().and_then(series_file_date) else {
            continue;
        };
        if best.as_ref().is_none_or(|(d, _)| date > *d) {
            best = Some((date, entry.path()));
        }
    }
    Ok(best)
}

/// Extract the date from a `usempl_YYYY-MM-DD.csv` file name.
fn series_file_date(name: &str) -> Option<NaiveDate> {
    let stem = name.strip_prefix("usempl_")?.strip_suffix(".csv")?;
    NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
}

fn parse_record(record: &StringRecord) -> Result<SeriesPoint, String> {
    let raw_date = record
        .get(0)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing date.".to_string())?;
    let raw_level = record.get(1).ok_or_else(|| "Missing value column.".to_string())?;

    let date = parse_date(raw_date)?;
    let level = parse_level(raw_level)?;
    Ok(SeriesPoint::new(month_start(date), level))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!("Invalid date '{s}'. Expected YYYY-MM-DD."))
}

fn parse_level(s: &str) -> Result<f64, String> {
    if s.is_empty() || NA_VALUES.iter().any(|na| s.eq_ignore_ascii_case(na)) {
        return Err("Missing value.".to_string());
    }
    let v = s
        .replace(',', "")
        .parse::<f64>()
        .map_err(|_| format!("Invalid value '{s}'."))?;
    if !v.is_finite() || v < 0.0 {
        return Err(format!("Invalid value '{s}' (must be finite and >= 0)."));
    }
    Ok(v)
}
