//! Remote implementation of StateRecorder
//!
//! Ships snapshot and step envelopes as JSON to a collector over HTTP.

use async_trait::async_trait;
use cascade_recorder::{
    FlowInstance, ManagedService, RecorderError, RecorderResult, ServiceConfig, SnapshotRequest,
    StateRecorder, StepRequest, SERVICE_STATE_RECORDER, SNAPSHOT_PATH, STEP_PATH,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect, Client};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::settings::RemoteSettings;

/// State recorder that posts records to a remote collector
///
/// The host is fixed at construction. Every call builds a fresh envelope,
/// posts it and reports the outcome; nothing else is retained between calls.
#[derive(Debug, Clone)]
pub struct RemoteStateRecorder {
    /// Collector base URL
    host: String,

    /// Whether the engine should use this recorder
    enabled: bool,

    /// Whole-request timeout, reported back on expiry
    timeout: Duration,

    /// Connect timeout, reported back when connecting expires
    connect_timeout: Duration,

    /// HTTP client
    client: Client,
}

impl RemoteStateRecorder {
    /// Create a recorder from its service configuration
    ///
    /// Fails with a `ConfigurationError` when `host` is missing or the
    /// host/port combination cannot form a collector URL.
    pub fn new(config: &ServiceConfig) -> RecorderResult<Self> {
        let settings = RemoteSettings::from_settings(&config.settings)?;
        Self::with_settings(config.enabled, &settings)
    }

    /// Create a recorder from already validated settings
    pub fn with_settings(enabled: bool, settings: &RemoteSettings) -> RecorderResult<Self> {
        // 3xx counts as a rejection, so redirects are not followed
        let client = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| {
                RecorderError::ConfigurationError(format!("Failed to create HTTP client: {}", e))
            })?;

        debug!("RemoteStateRecorder: state recorder server = {}", settings.host);

        Ok(Self {
            host: settings.host.clone(),
            enabled,
            timeout: settings.timeout,
            connect_timeout: settings.connect_timeout,
            client,
        })
    }

    /// Collector base URL
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    async fn post_record<T>(&self, path: &str, record: &T) -> RecorderResult<()>
    where
        T: Serialize + Sync,
    {
        let uri = format!("{}{}", self.host, path);
        let body = serde_json::to_vec(record)?;

        debug!(uri = %uri, bytes = body.len(), "POST record");

        let response = self
            .client
            .post(&uri)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                let err = self.transport_error(e);
                debug!(uri = %uri, error = %err, "Failed to reach state collector");
                err
            })?;

        let status = response.status();
        debug!("response Status: {}", status);

        if status.as_u16() >= 300 {
            let body = response.text().await.unwrap_or_default();
            debug!(uri = %uri, status = status.as_u16(), body = %body, "State collector rejected record");
            return Err(RecorderError::RemoteRejection {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    fn transport_error(&self, err: reqwest::Error) -> RecorderError {
        if err.is_timeout() {
            RecorderError::Timeout(self.timeout_for(err.is_connect()))
        } else {
            RecorderError::TransportError(err.to_string())
        }
    }

    /// The limit that expired: the connect timeout while connecting,
    /// the whole-request timeout otherwise
    fn timeout_for(&self, connecting: bool) -> Duration {
        if connecting {
            self.connect_timeout
        } else {
            self.timeout
        }
    }
}

#[async_trait]
impl StateRecorder for RemoteStateRecorder {
    async fn record_snapshot(&self, instance: &FlowInstance) -> RecorderResult<()> {
        let request = SnapshotRequest::from_instance(instance)?;
        self.post_record(SNAPSHOT_PATH, &request).await
    }

    async fn record_step(&self, instance: &FlowInstance) -> RecorderResult<()> {
        let request = StepRequest::from_instance(instance);
        self.post_record(STEP_PATH, &request).await
    }
}

impl ManagedService for RemoteStateRecorder {
    fn name(&self) -> &str {
        SERVICE_STATE_RECORDER
    }

    fn enabled(&self) -> bool {
        self.enabled
    }
}
