//! Integration tests for Layer 3: World
//!
//! Tests for the World facade: inheritance through views, relations,
//! change hooks, snapshots, and cache consistency.

mod hooks;
mod relations;
mod snapshot;

use tracing_subscriber::EnvFilter;

/// Routes log output to the test harness. Filter with `RUST_LOG`.
pub fn trace() {
    let _ = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
