//! Construction of the configured state recorder
//!
//! Picks the sink from a `ServiceConfig`: a no-op recorder when recording is
//! disabled, otherwise the remote recorder wrapped in its failure policy.

use cascade_recorder::{
    GuardedRecorder, NoopStateRecorder, RecorderResult, ServiceConfig, ServiceRecorder,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::remote::RemoteStateRecorder;
use crate::settings::RemoteSettings;

/// Build the recorder described by `config`
///
/// The handle records, cancels and answers the service registry
/// (`name`, `enabled`, `start`, `stop`). Configuration errors are returned
/// as-is so startup can abort loudly.
pub fn create_state_recorder(config: &ServiceConfig) -> RecorderResult<Arc<dyn ServiceRecorder>> {
    if !config.enabled {
        info!(name = %config.name, "State recording disabled");
        return Ok(Arc::new(NoopStateRecorder::with_enabled(false)));
    }

    let settings = RemoteSettings::from_settings(&config.settings)?;
    let remote = RemoteStateRecorder::with_settings(config.enabled, &settings)?;

    info!(
        name = %config.name,
        host = %settings.host,
        policy = ?settings.on_failure,
        "State recording enabled"
    );

    Ok(Arc::new(GuardedRecorder::new(remote, settings.on_failure)))
}

/// Build the recorder described by `config`, falling back to a no-op
/// recorder when the configuration is invalid
///
/// The configuration error is still logged at error level.
pub fn create_state_recorder_or_noop(config: &ServiceConfig) -> Arc<dyn ServiceRecorder> {
    match create_state_recorder(config) {
        Ok(recorder) => recorder,
        Err(e) => {
            error!(name = %config.name, error = %e, "Invalid state recorder configuration, recording disabled");
            Arc::new(NoopStateRecorder::with_enabled(false))
        }
    }
}
