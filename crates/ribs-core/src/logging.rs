//! Log output setup for binaries and tests.
//!
//! The library itself only emits `tracing` events; nothing is printed until a
//! subscriber is installed.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `RIBS_LOG=ribs_core=debug`.
pub const LOG_ENV: &str = "RIBS_LOG";

/// Install a formatting subscriber.
///
/// The filter comes from [`LOG_ENV`] when set, `default_filter` otherwise.
/// Returns false if a global subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
