//! Reporting utilities: formatted terminal summaries of a run.

pub mod format;

pub use format::*;
