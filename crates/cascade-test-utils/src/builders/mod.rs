//! Builders for test fixtures.

mod flow_instance;

pub use flow_instance::*;
