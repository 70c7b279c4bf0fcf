//! Input/output helpers.
//!
//! - series CSV ingest (`ingest`)
//! - series and streak CSV exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
