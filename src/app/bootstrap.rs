//! Process-level setup: logging.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global `tracing` subscriber (stderr, no targets).
///
/// `RUST_LOG` wins when set; otherwise `level` is used, falling back to
/// `info` when it is not a valid filter directive. Calling this twice is a
/// no-op, so tests and embedders can call `run` repeatedly.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_does_not_panic() {
        init_logging("debug");
        init_logging("not a level ===");
    }
}
