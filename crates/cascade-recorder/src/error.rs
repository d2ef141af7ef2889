use std::time::Duration;
use thiserror::Error;

/// Error type for state recording
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecorderError {
    /// Recorder configuration is missing or invalid
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The request to the collector could not be completed
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The request to the collector did not finish in time
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The collector answered with a non-success status
    #[error("Remote collector rejected record: status {status}, body: {body}")]
    RemoteRejection {
        /// HTTP status code returned by the collector
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The recording call was abandoned through its cancellation signal
    #[error("Recording cancelled")]
    Cancelled,

    /// A flow instance transition was requested from the wrong status
    #[error("Invalid flow instance state: {0}")]
    InvalidState(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl RecorderError {
    /// True for failures of the network round trip itself, timeouts included
    pub fn is_transport(&self) -> bool {
        matches!(self, RecorderError::TransportError(_) | RecorderError::Timeout(_))
    }

    /// True when the error comes from configuration rather than a recording call
    pub fn is_configuration(&self) -> bool {
        matches!(self, RecorderError::ConfigurationError(_))
    }
}

/// Result type for recorder operations
pub type RecorderResult<T> = Result<T, RecorderError>;

impl From<serde_json::Error> for RecorderError {
    fn from(err: serde_json::Error) -> Self {
        RecorderError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for RecorderError {
    fn from(err: serde_yaml::Error) -> Self {
        RecorderError::ConfigurationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            (
                RecorderError::ConfigurationError("host missing".to_string()),
                "Configuration error: host missing",
            ),
            (
                RecorderError::TransportError("connection refused".to_string()),
                "Transport error: connection refused",
            ),
            (
                RecorderError::Timeout(Duration::from_millis(250)),
                "Request timed out after 250ms",
            ),
            (
                RecorderError::RemoteRejection {
                    status: 500,
                    body: "boom".to_string(),
                },
                "Remote collector rejected record: status 500, body: boom",
            ),
            (RecorderError::Cancelled, "Recording cancelled"),
            (
                RecorderError::InvalidState("finished".to_string()),
                "Invalid flow instance state: finished",
            ),
            (
                RecorderError::SerializationError("bad".to_string()),
                "Serialization error: bad",
            ),
        ];

        for (error, expected_msg) in errors {
            assert_eq!(error.to_string(), expected_msg);
        }
    }

    #[test]
    fn test_transport_classification() {
        assert!(RecorderError::TransportError("dns".to_string()).is_transport());
        assert!(RecorderError::Timeout(Duration::from_secs(1)).is_transport());
        assert!(!RecorderError::Cancelled.is_transport());
        assert!(!RecorderError::RemoteRejection {
            status: 503,
            body: String::new()
        }
        .is_transport());
        assert!(RecorderError::ConfigurationError("x".to_string()).is_configuration());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error: RecorderError = json_error.into();

        match error {
            RecorderError::SerializationError(msg) => {
                assert!(msg.contains("expected value"));
            }
            _ => panic!("Expected SerializationError variant"),
        }
    }

    #[test]
    fn test_from_yaml_error_is_configuration() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("a: [").unwrap_err();
        let error: RecorderError = yaml_error.into();
        assert!(error.is_configuration());
    }
}
