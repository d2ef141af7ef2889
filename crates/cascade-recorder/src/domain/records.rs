//! Serializable envelopes sent to the collector
//!
//! Both envelopes are built fresh for every recording call and stamped with
//! whatever the instance reports at that moment.

use crate::domain::{change_tracker::ChangeTracker, flow_instance::FlowInstance};
use crate::error::RecorderResult;
use serde::{Deserialize, Serialize};

/// Path of the snapshot endpoint, relative to the collector host
pub const SNAPSHOT_PATH: &str = "/instances/snapshot";

/// Path of the step endpoint, relative to the collector host
pub const STEP_PATH: &str = "/instances/steps";

/// Full, self-contained copy of an instance at the time of the call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRequest {
    /// Step counter of the instance
    pub id: i64,
    /// Instance identity
    #[serde(rename = "flowID")]
    pub flow_id: String,
    /// Structural/version code of the instance
    pub state: i32,
    /// Numeric lifecycle status code
    pub status: i32,
    /// The serialized instance
    #[serde(rename = "snapshotData")]
    pub snapshot_data: serde_json::Value,
}

impl SnapshotRequest {
    /// Stamp a snapshot envelope from the instance's current values
    pub fn from_instance(instance: &FlowInstance) -> RecorderResult<Self> {
        Ok(Self {
            id: instance.step_id(),
            flow_id: instance.id().to_string(),
            state: instance.state(),
            status: instance.status().code(),
            snapshot_data: serde_json::to_value(instance)?,
        })
    }
}

/// Incremental delta of the step just completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRequest {
    /// Step counter of the instance
    pub id: i64,
    /// Instance identity
    #[serde(rename = "flowID")]
    pub flow_id: String,
    /// Structural/version code of the instance
    pub state: i32,
    /// Numeric lifecycle status code
    pub status: i32,
    /// The serialized change tracker
    #[serde(rename = "stepData")]
    pub step_data: ChangeTracker,
}

impl StepRequest {
    /// Stamp a step envelope from the instance's current values
    pub fn from_instance(instance: &FlowInstance) -> Self {
        Self {
            id: instance.step_id(),
            flow_id: instance.id().to_string(),
            state: instance.state(),
            status: instance.status().code(),
            step_data: instance.change_tracker().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::flow_instance::FlowInstanceId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn running_instance() -> FlowInstance {
        let mut instance =
            FlowInstance::with_id(FlowInstanceId("inst-42".to_string()), "res://flow:billing");
        instance.start().unwrap();
        instance.set_state(2);
        instance
            .apply_step(ChangeTracker::new(json!({"attrs": {"total": 12}})))
            .unwrap();
        instance
    }

    #[test]
    fn test_snapshot_envelope_shape() {
        let instance = running_instance();
        let request = SnapshotRequest::from_instance(&instance).unwrap();
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["id"], json!(1));
        assert_eq!(value["flowID"], json!("inst-42"));
        assert_eq!(value["state"], json!(2));
        assert_eq!(value["status"], json!(100));
        assert_eq!(value["snapshotData"], serde_json::to_value(&instance).unwrap());
        assert!(value.get("stepData").is_none());
    }

    #[test]
    fn test_step_envelope_shape() {
        let instance = running_instance();
        let value = serde_json::to_value(StepRequest::from_instance(&instance)).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 1,
                "flowID": "inst-42",
                "state": 2,
                "status": 100,
                "stepData": {"attrs": {"total": 12}}
            })
        );
    }

    #[test]
    fn test_id_follows_instance_step() {
        let mut instance = running_instance();
        instance.apply_step(ChangeTracker::empty()).unwrap();
        instance.apply_step(ChangeTracker::empty()).unwrap();

        assert_eq!(StepRequest::from_instance(&instance).id, 3);
        assert_eq!(SnapshotRequest::from_instance(&instance).unwrap().id, 3);
    }
}
