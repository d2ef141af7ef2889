//! Service-registry integration for recorders

use crate::error::RecorderResult;

/// Well-known name under which the state recorder is registered
pub const SERVICE_STATE_RECORDER: &str = "stateRecorder";

/// A service the engine can look up by name and manage
pub trait ManagedService: Send + Sync {
    /// Registry name of the service
    fn name(&self) -> &str;

    /// Whether the engine should use this service at all
    fn enabled(&self) -> bool;

    /// Acquire resources before first use
    fn start(&self) -> RecorderResult<()> {
        Ok(())
    }

    /// Release resources on shutdown
    fn stop(&self) -> RecorderResult<()> {
        Ok(())
    }
}
