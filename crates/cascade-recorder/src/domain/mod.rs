/// Flow instance boundary model
pub mod flow_instance;

/// Lifecycle status codes
pub mod status;

/// Opaque step deltas
pub mod change_tracker;

/// Request envelopes
pub mod records;
