//! Structured logging setup for the CLI.

use tracing_subscriber::EnvFilter;

/// Initialize tracing-subscriber.
///
/// Honors `RUST_LOG` when set, otherwise falls back to `default_level`.
/// Safe to call more than once; later calls are no-ops.
pub fn init(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
