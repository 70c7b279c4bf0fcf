//! Numerical utilities: cubic spline interpolation.

pub mod spline;

pub use spline::*;
