//! Testing utilities for Cascade state recorders.
//!
//! Provides a wiremock-backed [`MockCollector`] standing in for the remote
//! state collector and a [`FlowInstanceBuilder`] for instances in a known
//! lifecycle position.

pub mod builders;
pub mod collector;
pub mod util;

pub use builders::FlowInstanceBuilder;
pub use collector::MockCollector;
pub use util::init_test_tracing;
