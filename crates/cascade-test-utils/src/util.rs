//! Utility functions.

/// Route `tracing` output to the test harness; safe to call from every test
pub fn init_test_tracing() {
    cascade_monitoring::init_test_logging();
}
