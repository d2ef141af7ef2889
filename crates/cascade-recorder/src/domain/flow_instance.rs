use crate::domain::{change_tracker::ChangeTracker, status::FlowStatus};
use crate::error::{RecorderError, RecorderResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Value object: Flow Instance ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowInstanceId(pub String);

impl FlowInstanceId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the string representation of the ID
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlowInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A running execution of a flow definition, as seen by the recorder
///
/// The engine owns scheduling and step execution. This type only exposes
/// what recording needs (identity, step counter, state and status codes,
/// and the change tracker of the last step) plus the small set of
/// transitions the engine drives between recordings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowInstance {
    /// Unique identifier
    id: FlowInstanceId,

    /// URI of the flow definition this instance runs
    flow_uri: String,

    /// Step counter, advanced once per applied step
    step_id: i64,

    /// Structural/version code of the definition in use
    state: i32,

    /// Lifecycle status
    status: FlowStatus,

    /// Instance attributes (working data)
    #[serde(default)]
    attrs: BTreeMap<String, serde_json::Value>,

    /// Deltas of the most recent step
    #[serde(default)]
    change_tracker: ChangeTracker,

    /// Creation timestamp
    created_at: DateTime<Utc>,

    /// Last updated timestamp
    updated_at: DateTime<Utc>,
}

impl FlowInstance {
    /// Create a new, not yet started instance of the given flow
    pub fn new(flow_uri: impl Into<String>) -> Self {
        Self::with_id(FlowInstanceId::generate(), flow_uri)
    }

    /// Create a new instance with a caller-chosen identifier
    pub fn with_id(id: FlowInstanceId, flow_uri: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            flow_uri: flow_uri.into(),
            step_id: 0,
            state: 0,
            status: FlowStatus::NotStarted,
            attrs: BTreeMap::new(),
            change_tracker: ChangeTracker::empty(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Instance identity, reported as `flowID`
    #[inline]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Typed instance identity
    #[inline]
    pub fn instance_id(&self) -> &FlowInstanceId {
        &self.id
    }

    /// URI of the flow definition
    #[inline]
    pub fn flow_uri(&self) -> &str {
        &self.flow_uri
    }

    /// Current step counter
    #[inline]
    pub fn step_id(&self) -> i64 {
        self.step_id
    }

    /// Structural/version code
    #[inline]
    pub fn state(&self) -> i32 {
        self.state
    }

    /// Lifecycle status
    #[inline]
    pub fn status(&self) -> FlowStatus {
        self.status
    }

    /// Deltas produced by the most recent step
    #[inline]
    pub fn change_tracker(&self) -> &ChangeTracker {
        &self.change_tracker
    }

    /// Look up an instance attribute
    pub fn attr(&self, name: &str) -> Option<&serde_json::Value> {
        self.attrs.get(name)
    }

    /// All instance attributes, ordered by name
    pub fn attrs(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.attrs
    }

    /// Creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Timestamp of the last change
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Start the instance
    pub fn start(&mut self) -> RecorderResult<()> {
        if self.status != FlowStatus::NotStarted {
            return Err(RecorderError::InvalidState(format!(
                "Cannot start flow in state: {}",
                self.status
            )));
        }

        self.status = FlowStatus::Active;
        self.touch();
        Ok(())
    }

    /// Advance the step counter and replace the tracked changes with the
    /// deltas of the step just completed
    pub fn apply_step(&mut self, changes: ChangeTracker) -> RecorderResult<i64> {
        if self.status != FlowStatus::Active {
            return Err(RecorderError::InvalidState(format!(
                "Cannot apply step while flow is in state: {}",
                self.status
            )));
        }

        self.step_id += 1;
        self.change_tracker = changes;
        self.touch();
        Ok(self.step_id)
    }

    /// Set the structural/version code
    pub fn set_state(&mut self, state: i32) {
        self.state = state;
        self.touch();
    }

    /// Set an instance attribute
    pub fn set_attr(&mut self, name: impl Into<String>, value: serde_json::Value) {
        self.attrs.insert(name.into(), value);
        self.touch();
    }

    /// Complete the instance successfully
    pub fn complete(&mut self) -> RecorderResult<()> {
        if self.status != FlowStatus::Active {
            return Err(RecorderError::InvalidState(format!(
                "Cannot complete flow in state: {}",
                self.status
            )));
        }

        self.status = FlowStatus::Completed;
        self.touch();
        Ok(())
    }

    /// Mark the instance as failed, keeping the error as an attribute
    pub fn fail(&mut self, error: impl Into<String>) -> RecorderResult<()> {
        if self.status.is_terminal() {
            return Err(RecorderError::InvalidState(format!(
                "Cannot fail flow in state: {}",
                self.status
            )));
        }

        self.status = FlowStatus::Failed;
        self.attrs
            .insert("_error".to_string(), serde_json::Value::String(error.into()));
        self.touch();
        Ok(())
    }

    /// Cancel the instance
    pub fn cancel(&mut self) -> RecorderResult<()> {
        if self.status.is_terminal() {
            return Err(RecorderError::InvalidState(format!(
                "Cannot cancel flow in state: {}",
                self.status
            )));
        }

        self.status = FlowStatus::Cancelled;
        self.touch();
        Ok(())
    }

    #[inline]
    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
