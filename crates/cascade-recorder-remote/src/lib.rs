//! Cascade Remote Recorder
//!
//! HTTP+JSON implementation of the `StateRecorder` capability. Snapshots are
//! posted to `<host>/instances/snapshot` and steps to `<host>/instances/steps`.

pub mod factory;
pub mod remote;
pub mod settings;

pub use factory::{create_state_recorder, create_state_recorder_or_noop};
pub use remote::RemoteStateRecorder;
pub use settings::{normalize_host, RemoteSettings};
