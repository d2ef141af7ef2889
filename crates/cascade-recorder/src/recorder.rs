//! The state recording capability and its generic implementations

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error};

use crate::domain::flow_instance::FlowInstance;
use crate::error::{RecorderError, RecorderResult};
use crate::service::{ManagedService, SERVICE_STATE_RECORDER};

/// Future that abandons a recording call once it completes
pub type CancelSignal = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A sink that can record snapshots and steps of a flow instance
///
/// The engine depends only on this trait, so recorders can be swapped
/// (remote collector, in-memory, no-op) without touching the engine.
/// Implementations must be safe to call concurrently.
#[async_trait]
pub trait StateRecorder: Send + Sync {
    /// Record a full snapshot of the instance's current state
    async fn record_snapshot(&self, instance: &FlowInstance) -> RecorderResult<()>;

    /// Record the changes of the step the instance just completed
    async fn record_step(&self, instance: &FlowInstance) -> RecorderResult<()>;

    /// Record a snapshot, giving up with `Cancelled` once `cancel` completes
    ///
    /// An already completed signal wins over the recording call.
    async fn record_snapshot_until(
        &self,
        instance: &FlowInstance,
        cancel: CancelSignal,
    ) -> RecorderResult<()> {
        tokio::select! {
            biased;
            _ = cancel => Err(RecorderError::Cancelled),
            result = self.record_snapshot(instance) => result,
        }
    }

    /// Record a step, giving up with `Cancelled` once `cancel` completes
    async fn record_step_until(
        &self,
        instance: &FlowInstance,
        cancel: CancelSignal,
    ) -> RecorderResult<()> {
        tokio::select! {
            biased;
            _ = cancel => Err(RecorderError::Cancelled),
            result = self.record_step(instance) => result,
        }
    }
}

#[async_trait]
impl<R: StateRecorder + ?Sized> StateRecorder for Arc<R> {
    async fn record_snapshot(&self, instance: &FlowInstance) -> RecorderResult<()> {
        (**self).record_snapshot(instance).await
    }

    async fn record_step(&self, instance: &FlowInstance) -> RecorderResult<()> {
        (**self).record_step(instance).await
    }

    async fn record_snapshot_until(
        &self,
        instance: &FlowInstance,
        cancel: CancelSignal,
    ) -> RecorderResult<()> {
        (**self).record_snapshot_until(instance, cancel).await
    }

    async fn record_step_until(
        &self,
        instance: &FlowInstance,
        cancel: CancelSignal,
    ) -> RecorderResult<()> {
        (**self).record_step_until(instance, cancel).await
    }
}

/// A recorder the engine can both record into and manage as a service
pub trait ServiceRecorder: StateRecorder + ManagedService {}

impl<T: StateRecorder + ManagedService + ?Sized> ServiceRecorder for T {}

/// Recorder that drops everything
///
/// Used when recording is disabled, or as a fallback when the configured
/// recorder cannot be built.
#[derive(Debug, Clone, Default)]
pub struct NoopStateRecorder {
    enabled: bool,
}

impl NoopStateRecorder {
    /// A disabled no-op recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// A no-op recorder standing in for a recorder with the given flag
    pub fn with_enabled(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl StateRecorder for NoopStateRecorder {
    async fn record_snapshot(&self, instance: &FlowInstance) -> RecorderResult<()> {
        debug!(flow_id = %instance.id(), "Snapshot dropped by no-op recorder");
        Ok(())
    }

    async fn record_step(&self, instance: &FlowInstance) -> RecorderResult<()> {
        debug!(flow_id = %instance.id(), step_id = instance.step_id(), "Step dropped by no-op recorder");
        Ok(())
    }
}

impl ManagedService for NoopStateRecorder {
    fn name(&self) -> &str {
        SERVICE_STATE_RECORDER
    }

    fn enabled(&self) -> bool {
        self.enabled
    }
}

/// What a guarded recorder does with a failed recording call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Return the error to the caller
    Propagate,
    /// Log the error and report success
    #[default]
    Log,
    /// Report success without logging
    Ignore,
}

impl FromStr for FailurePolicy {
    type Err = RecorderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "propagate" => Ok(FailurePolicy::Propagate),
            "log" => Ok(FailurePolicy::Log),
            "ignore" => Ok(FailurePolicy::Ignore),
            other => Err(RecorderError::ConfigurationError(format!(
                "Unknown failure policy: {}",
                other
            ))),
        }
    }
}

/// Applies a [`FailurePolicy`] to another recorder
///
/// Keeps recording failures from leaking into flow execution unless the
/// integration asks for them.
#[derive(Debug, Clone)]
pub struct GuardedRecorder<R> {
    inner: R,
    policy: FailurePolicy,
}

impl<R: StateRecorder> GuardedRecorder<R> {
    /// Wrap `inner`, handling its failures according to `policy`
    pub fn new(inner: R, policy: FailurePolicy) -> Self {
        Self { inner, policy }
    }

    /// The policy applied to failed calls
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// The wrapped recorder
    pub fn inner(&self) -> &R {
        &self.inner
    }

    fn apply(&self, kind: &str, instance: &FlowInstance, result: RecorderResult<()>) -> RecorderResult<()> {
        match (result, self.policy) {
            (Ok(()), _) => Ok(()),
            // cancellation is requested by the caller, never contained
            (Err(RecorderError::Cancelled), _) => Err(RecorderError::Cancelled),
            (Err(e), FailurePolicy::Propagate) => Err(e),
            (Err(e), FailurePolicy::Log) => {
                error!(
                    flow_id = %instance.id(),
                    step_id = instance.step_id(),
                    error = %e,
                    "Failed to record {}", kind
                );
                Ok(())
            }
            (Err(_), FailurePolicy::Ignore) => Ok(()),
        }
    }
}

#[async_trait]
impl<R: StateRecorder> StateRecorder for GuardedRecorder<R> {
    async fn record_snapshot(&self, instance: &FlowInstance) -> RecorderResult<()> {
        let result = self.inner.record_snapshot(instance).await;
        self.apply("snapshot", instance, result)
    }

    async fn record_step(&self, instance: &FlowInstance) -> RecorderResult<()> {
        let result = self.inner.record_step(instance).await;
        self.apply("step", instance, result)
    }

    async fn record_snapshot_until(
        &self,
        instance: &FlowInstance,
        cancel: CancelSignal,
    ) -> RecorderResult<()> {
        let result = self.inner.record_snapshot_until(instance, cancel).await;
        self.apply("snapshot", instance, result)
    }

    async fn record_step_until(
        &self,
        instance: &FlowInstance,
        cancel: CancelSignal,
    ) -> RecorderResult<()> {
        let result = self.inner.record_step_until(instance, cancel).await;
        self.apply("step", instance, result)
    }
}

impl<R: StateRecorder + ManagedService> ManagedService for GuardedRecorder<R> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn enabled(&self) -> bool {
        self.inner.enabled()
    }

    fn start(&self) -> RecorderResult<()> {
        self.inner.start()
    }

    fn stop(&self) -> RecorderResult<()> {
        self.inner.stop()
    }
}
