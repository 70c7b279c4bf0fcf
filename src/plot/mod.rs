//! Terminal plotting.

pub mod ascii;

pub use ascii::render_ascii_streaks;
