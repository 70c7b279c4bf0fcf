//! FRED integration for the monthly PAYEMS series.
//!
//! Two endpoints are supported:
//! - the JSON observations API, used when `FRED_API_KEY` is set (env or `.env`)
//! - the public `fredgraph.csv` download, which needs no key
//!
//! Either way the result is a list of `SeriesPoint`s sorted oldest to newest.
//! Missing values (`"."`) are dropped, as they are in local CSV files.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::{SeriesPoint, month_start};
use crate::error::AppError;
use crate::io::ingest::read_series_csv;

const API_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const GRAPH_URL: &str = "https://fred.stlouisfed.org/graph/fredgraph.csv";
const OBS_LIMIT: usize = 100_000;

/// First month requested from FRED (PAYEMS starts in January 1939).
pub fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1939, 1, 1).unwrap_or(NaiveDate::MIN)
}

enum Endpoint {
    Api { api_key: String },
    Graph,
}

pub struct FredClient {
    client: Client,
    endpoint: Endpoint,
}

impl FredClient {
    /// Build a client, preferring the keyed JSON API when a key is configured.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let endpoint = match std::env::var("FRED_API_KEY") {
            Ok(api_key) if !api_key.trim().is_empty() => Endpoint::Api { api_key },
            _ => {
                debug!("FRED_API_KEY not set; using the public fredgraph CSV endpoint");
                Endpoint::Graph
            }
        };

        let client = Client::builder()
            .user_agent(concat!("usempl-streaks/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::fetch(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// Fetch `series_id` from `start` through `end` (or the latest release).
    pub fn fetch_series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<Vec<SeriesPoint>, AppError> {
        info!(series_id, %start, end = ?end, "downloading from FRED");

        let mut points = match &self.endpoint {
            Endpoint::Api { api_key } => self.fetch_api(series_id, api_key, start, end)?,
            Endpoint::Graph => self.fetch_graph(series_id, start, end)?,
        };

        points.sort_by_key(|p| p.date);
        if points.is_empty() {
            return Err(AppError::fetch(format!("No observations returned for series {series_id}.")));
        }

        debug!(series_id, n = points.len(), "FRED observations received");
        Ok(points)
    }

    fn fetch_api(
        &self,
        series_id: &str,
        api_key: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<Vec<SeriesPoint>, AppError> {
        let mut req = self.client.get(API_URL).query(&[
            ("series_id", series_id),
            ("api_key", api_key),
            ("file_type", "json"),
            ("sort_order", "asc"),
            ("observation_start", &start.to_string()),
            ("limit", &OBS_LIMIT.to_string()),
        ]);

        if let Some(date) = end {
            req = req.query(&[("observation_end", &date.to_string())]);
        }

        let resp = req
            .send()
            .map_err(|e| AppError::fetch(format!("FRED request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(format!(
                "FRED request failed with status {}.",
                resp.status()
            )));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| AppError::fetch(format!("Failed to parse FRED response: {e}")))?;

        let total = body.observations.len();
        let out: Vec<SeriesPoint> = body.observations.iter().filter_map(to_point).collect();
        let dropped = total - out.len();
        if dropped > 0 {
            warn!(series_id, dropped, "FRED observations without a valid date or value were skipped");
        }

        Ok(out)
    }

    fn fetch_graph(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<Vec<SeriesPoint>, AppError> {
        let mut req = self
            .client
            .get(GRAPH_URL)
            .query(&[("id", series_id), ("cosd", &start.to_string())]);

        if let Some(date) = end {
            req = req.query(&[("coed", &date.to_string())]);
        }

        let resp = req
            .send()
            .map_err(|e| AppError::fetch(format!("FRED request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(format!(
                "FRED request failed with status {}.",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::fetch(format!("Failed to read FRED response: {e}")))?;

        let ingest = read_series_csv(body.as_bytes())
            .map_err(|e| AppError::fetch(format!("Failed to parse FRED CSV: {e}")))?;
        if !ingest.row_errors.is_empty() {
            warn!(
                series_id,
                dropped = ingest.row_errors.len(),
                "FRED rows without a value were skipped"
            );
        }

        Ok(ingest.points)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

/// One API observation as a point; `None` when the date or value is unusable.
fn to_point(obs: &Observation) -> Option<SeriesPoint> {
    let value = parse_value(&obs.value)?;
    let date = NaiveDate::parse_from_str(obs.date.trim(), "%Y-%m-%d").ok()?;
    Some(SeriesPoint::new(month_start(date), value))
}

/// Same acceptance rule as local CSV levels: finite and non-negative.
fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    (v.is_finite() && v >= 0.0).then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_value_skips_missing_markers() {
        assert_eq!(parse_value("158,"), None);
        assert_eq!(parse_value("."), None);
        assert_eq!(parse_value("  "), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("-12"), None);
        assert_eq!(parse_value(" 158123 "), Some(158_123.0));
    }

    #[test]
    fn bad_rows_are_dropped_not_fatal() {
        let body = r#"{"observations": [
            {"date": "1939-01-01", "value": "29923"},
            {"date": "1939-13-01", "value": "30000"},
            {"date": "1939-03-01", "value": "-5"},
            {"date": "1939-04-15", "value": "30200"}
        ]}"#;
        let parsed: ObservationsResponse = serde_json::from_str(body).unwrap();
        let points: Vec<SeriesPoint> = parsed.observations.iter().filter_map(to_point).collect();

        let day = |m| NaiveDate::from_ymd_opt(1939, m, 1).unwrap();
        assert_eq!(
            points,
            vec![SeriesPoint::new(day(1), 29_923.0), SeriesPoint::new(day(4), 30_200.0)]
        );
    }

    #[test]
    fn observations_response_deserializes() {
        let body = r#"{
            "realtime_start": "2024-02-02",
            "count": 2,
            "observations": [
                {"realtime_start": "2024-02-02", "date": "1939-01-01", "value": "29923"},
                {"realtime_start": "2024-02-02", "date": "1939-02-01", "value": "."}
            ]
        }"#;
        let parsed: ObservationsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.observations.len(), 2);
        assert_eq!(parsed.observations[0].date, "1939-01-01");
        assert_eq!(parse_value(&parsed.observations[1].value), None);
    }
}
