//! Test logging
//!
//! Call [`init_test_logging`] at the top of a test to see the engines'
//! tracing output, filtered by `RUST_LOG` as usual.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber once; later calls are no-ops.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
