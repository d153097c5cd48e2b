//! Process-wide tracing setup shared by the engine binary and tests.

/// Tracing configuration (filters, output format).
pub mod tracing;

/// Initialize JSON logging filtered by `RUST_LOG` (default `info`).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(tracing::DEFAULT_FILTER);
}

/// Human-readable output routed through the test harness's capture.
pub fn init_for_tests() {
    tracing::init_for_tests(tracing::DEFAULT_FILTER);
}
