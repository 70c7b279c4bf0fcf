//! Data acquisition: FRED download and the series loader.

pub mod fred;
pub mod series;

pub use fred::FredClient;
pub use series::{LoadedSeries, compute_gains, extend_with_annual, load_series, merge_series};
