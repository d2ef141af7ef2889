//!
//! Cascade Recorder - state recording for Cascade flow instances
//!
//! This crate defines the `StateRecorder` capability the flow engine records
//! into, the flow instance boundary model it consumes, and the request
//! envelopes shipped to a remote collector. Concrete sinks live in
//! `cascade-recorder-remote` and `cascade-recorder-inmemory`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - flow instance, status codes, change tracker, envelopes
pub mod domain;

/// Recorder trait and generic implementations
pub mod recorder;

/// Service registry integration
pub mod service;

/// Service configuration
pub mod config;

/// Error types
pub mod error;

// Re-export key types
pub use config::{default_config, ServiceConfig};
pub use domain::change_tracker::ChangeTracker;
pub use domain::flow_instance::{FlowInstance, FlowInstanceId};
pub use domain::records::{SnapshotRequest, StepRequest, SNAPSHOT_PATH, STEP_PATH};
pub use domain::status::FlowStatus;
pub use error::{RecorderError, RecorderResult};
pub use recorder::{
    CancelSignal, FailurePolicy, GuardedRecorder, NoopStateRecorder, ServiceRecorder, StateRecorder,
};
pub use service::{ManagedService, SERVICE_STATE_RECORDER};
