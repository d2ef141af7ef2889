//! End-to-end recording of a flow instance lifecycle against a mock collector.

use cascade_recorder::{
    ChangeTracker, FlowInstance, FlowStatus, RecorderResult, ServiceRecorder, StateRecorder,
    SNAPSHOT_PATH, STEP_PATH,
};
use cascade_recorder_remote::{create_state_recorder, RemoteStateRecorder};
use cascade_test_utils::{init_test_tracing, MockCollector};
use serde_json::json;
use std::sync::Arc;

/// Drive an instance the way the engine does: snapshot on transitions,
/// step record after every step.
async fn run_flow<R>(recorder: &R, instance: &mut FlowInstance) -> RecorderResult<()>
where
    R: StateRecorder + ?Sized,
{
    instance.start()?;
    recorder.record_snapshot(instance).await?;

    for task in ["reserve", "charge", "ship"] {
        instance.set_attr("lastTask", json!(task));
        instance.apply_step(ChangeTracker::new(json!({"task": task, "done": true})))?;
        recorder.record_step(instance).await?;
    }

    instance.complete()?;
    recorder.record_snapshot(instance).await
}

#[tokio::test]
async fn test_lifecycle_is_reconstructible_from_records() {
    init_test_tracing();
    let collector = MockCollector::start().await;
    collector.respond_with_status(SNAPSHOT_PATH, 200, 2).await;
    collector.respond_with_status(STEP_PATH, 200, 3).await;

    let recorder = RemoteStateRecorder::new(&collector.config()).unwrap();
    let mut instance = FlowInstance::new("res://flow:fulfilment");
    run_flow(&recorder, &mut instance).await.unwrap();

    let steps = collector.received_json(STEP_PATH).await;
    let ids: Vec<i64> = steps.iter().map(|s| s["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(steps[1]["stepData"], json!({"task": "charge", "done": true}));
    assert!(steps.iter().all(|s| s["flowID"] == json!(instance.id())));

    let snapshots = collector.received_json(SNAPSHOT_PATH).await;
    assert_eq!(snapshots[0]["id"], json!(0));
    assert_eq!(snapshots[0]["status"], json!(FlowStatus::Active.code()));
    assert_eq!(snapshots[1]["id"], json!(3));
    assert_eq!(snapshots[1]["status"], json!(FlowStatus::Completed.code()));
    assert_eq!(snapshots[1]["snapshotData"]["attrs"]["lastTask"], json!("ship"));

    let restored: FlowInstance = serde_json::from_value(snapshots[1]["snapshotData"].clone()).unwrap();
    assert_eq!(restored, instance);
}

#[tokio::test]
async fn test_failing_collector_does_not_stop_the_flow() {
    init_test_tracing();
    let collector = MockCollector::start().await;
    collector.respond_with_status(SNAPSHOT_PATH, 500, 2).await;
    collector.respond_with_status(STEP_PATH, 500, 3).await;

    let recorder: Arc<dyn ServiceRecorder> = create_state_recorder(&collector.config()).unwrap();
    let mut instance = FlowInstance::new("res://flow:fulfilment");

    run_flow(recorder.as_ref(), &mut instance).await.unwrap();
    assert_eq!(instance.status(), FlowStatus::Completed);
    assert_eq!(instance.step_id(), 3);
}
