//! Global subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install the process-wide JSON subscriber.
///
/// Filtering comes from `RUST_LOG`, defaulting to `info` — e.g.
/// `RUST_LOG=tourledger_realtime=debug` surfaces per-tick events. Uses
/// `try_init`, so calling this again (tests, multiple binaries in one
/// process) is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
