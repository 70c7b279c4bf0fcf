//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - series values (`SeriesPoint`, `Observation`)
//! - streak outputs (`Streak`, `StreakPoint`, `StreakCollection`, `StreakExtrema`)
//! - run configuration derived from CLI flags (`RunConfig`, `OutputDirs`, `ChartStyle`)

pub mod types;

pub use types::*;
