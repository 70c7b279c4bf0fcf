//! `usempl-streaks` library crate.
//!
//! The binary (`usempl`) is a thin wrapper around this library so the loader,
//! the streak segmentation and the renderers are testable without spawning
//! processes or touching the network.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod render;
pub mod report;
pub mod streaks;
