//! Streak segmentation: splitting the gain series into maximal runs of
//! strictly positive monthly gains, plus the extrema used to scale charts.

pub mod segment;

pub use segment::*;
