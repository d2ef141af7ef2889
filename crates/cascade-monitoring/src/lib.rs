//! Logging setup for Cascade state recorder services.
//!
//! Recorder crates only emit `tracing` events; hosting processes call
//! [`init_logging`] once at startup and tests call [`init_test_logging`].

pub mod logging;

pub use logging::{init_logging, init_test_logging, LoggingConfig};
