//! In-memory state recorder for the Cascade Platform
//!
//! Keeps every snapshot and step envelope it is handed, exactly as the
//! remote recorder would post them. Useful for development, tests and
//! embedding where no collector is running.

use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use cascade_recorder::{
    FlowInstance, ManagedService, RecorderResult, SnapshotRequest, StateRecorder, StepRequest,
    SERVICE_STATE_RECORDER,
};


#[derive(Debug, Default)]
struct Records {
    snapshots: Vec<SnapshotRequest>,
    steps: Vec<StepRequest>,
}

/// Recorder that stores envelopes in process memory
///
/// Clones share the same storage, so a clone handed to the engine can be
/// inspected through the handle kept by the caller.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateRecorder {
    records: Arc<RwLock<Records>>,
}

impl InMemoryStateRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// All snapshots in recording order
    pub async fn snapshots(&self) -> Vec<SnapshotRequest> {
        self.records.read().await.snapshots.clone()
    }

    /// All steps in recording order
    pub async fn steps(&self) -> Vec<StepRequest> {
        self.records.read().await.steps.clone()
    }

    /// Steps of one flow instance ordered by step id
    ///
    /// Concurrent callers may record out of order; the step id is the
    /// ordering key. Equal ids keep their recording order.
    pub async fn steps_for(&self, flow_id: &str) -> Vec<StepRequest> {
        let mut steps: Vec<StepRequest> = self
            .records
            .read()
            .await
            .steps
            .iter()
            .filter(|step| step.flow_id == flow_id)
            .cloned()
            .collect();
        steps.sort_by_key(|step| step.id);
        steps
    }

    /// Most recently recorded snapshot of one flow instance
    pub async fn latest_snapshot(&self, flow_id: &str) -> Option<SnapshotRequest> {
        self.records
            .read()
            .await
            .snapshots
            .iter()
            .rev()
            .find(|snapshot| snapshot.flow_id == flow_id)
            .cloned()
    }

    /// Drop everything recorded so far
    pub async fn clear(&self) {
        let mut records = self.records.write().await;
        records.snapshots.clear();
        records.steps.clear();
    }
}

#[async_trait]
impl StateRecorder for InMemoryStateRecorder {
    async fn record_snapshot(&self, instance: &FlowInstance) -> RecorderResult<()> {
        let request = SnapshotRequest::from_instance(instance)?;
        debug!(flow_id = %request.flow_id, step_id = request.id, "Storing snapshot");
        self.records.write().await.snapshots.push(request);
        Ok(())
    }

    async fn record_step(&self, instance: &FlowInstance) -> RecorderResult<()> {
        let request = StepRequest::from_instance(instance);
        debug!(flow_id = %request.flow_id, step_id = request.id, "Storing step");
        self.records.write().await.steps.push(request);
        Ok(())
    }
}

impl ManagedService for InMemoryStateRecorder {
    fn name(&self) -> &str {
        SERVICE_STATE_RECORDER
    }

    fn enabled(&self) -> bool {
        true
    }
}
