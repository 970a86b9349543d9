//! Logging setup for the `caffeine` binary.
//!
//! Log output goes to stderr so that stdout only carries command results
//! (JSON or CSV that may be piped elsewhere).

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging at `info`, or `debug` when `verbose` is set.
///
/// `RUST_LOG` always takes precedence.
pub fn init(verbose: bool) {
    init_with_level(if verbose { "debug" } else { "info" })
}

/// Initialize logging with a specific default level
///
/// # Arguments
/// * `default_level` - Default log level (debug, info, warn, error)
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
