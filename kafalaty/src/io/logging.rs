//! Log output setup.
//!
//! Library code logs through the `log` facade and emits diagnostics through
//! `tracing`. [`init_logging`] installs a `tracing-subscriber` formatter that
//! receives both.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides `default_filter`.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_logging(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
