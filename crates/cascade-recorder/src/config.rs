//! Configuration for recording services
//!
//! A `ServiceConfig` can be parsed from JSON or YAML and then adjusted from
//! environment variables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{RecorderError, RecorderResult};
use crate::recorder::FailurePolicy;
use crate::service::SERVICE_STATE_RECORDER;

/// Setting key: collector hostname or URL
pub const SETTING_HOST: &str = "host";

/// Setting key: collector port
pub const SETTING_PORT: &str = "port";

/// Setting key: whole-request timeout in milliseconds
pub const SETTING_TIMEOUT_MS: &str = "timeout_ms";

/// Setting key: connect timeout in milliseconds
pub const SETTING_CONNECT_TIMEOUT_MS: &str = "connect_timeout_ms";

/// Setting key: failure policy (`propagate`, `log` or `ignore`)
pub const SETTING_ON_FAILURE: &str = "on_failure";

/// Configuration of a managed service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Registry name of the service
    #[serde(default = "default_name")]
    pub name: String,

    /// Whether the engine should use the service
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Free-form string settings interpreted by the implementation
    #[serde(default)]
    pub settings: HashMap<String, String>,
}

fn default_name() -> String {
    SERVICE_STATE_RECORDER.to_string()
}

fn default_enabled() -> bool {
    true
}

/// Default state recorder configuration
///
/// The host is present but empty, so building a remote recorder from it
/// fails until a real host is supplied.
pub fn default_config() -> ServiceConfig {
    ServiceConfig {
        name: default_name(),
        enabled: true,
        settings: HashMap::from([(SETTING_HOST.to_string(), String::new())]),
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        default_config()
    }
}

impl ServiceConfig {
    /// Create a config with the given settings
    pub fn new(name: impl Into<String>, enabled: bool, settings: HashMap<String, String>) -> Self {
        Self {
            name: name.into(),
            enabled,
            settings,
        }
    }

    /// Look up a setting
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Builder-style setting override
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Parse a config from JSON
    pub fn from_json_str(raw: &str) -> RecorderResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| RecorderError::ConfigurationError(format!("Invalid JSON config: {}", e)))
    }

    /// Parse a config from YAML
    pub fn from_yaml_str(raw: &str) -> RecorderResult<Self> {
        serde_yaml::from_str(raw)
            .map_err(|e| RecorderError::ConfigurationError(format!("Invalid YAML config: {}", e)))
    }

    /// Load a config file, choosing the format from its extension
    pub fn from_file(path: impl AsRef<Path>) -> RecorderResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            RecorderError::ConfigurationError(format!(
                "Cannot read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&raw)?,
            Some("yaml") | Some("yml") => Self::from_yaml_str(&raw)?,
            other => {
                return Err(RecorderError::ConfigurationError(format!(
                    "Unsupported config file extension: {:?}",
                    other
                )))
            }
        };

        info!(path = %path.display(), name = %config.name, "Loaded service config");
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Recognized variables: `STATE_RECORDER_ENABLED`, `STATE_RECORDER_HOST`,
    /// `STATE_RECORDER_PORT`, `STATE_RECORDER_TIMEOUT_MS` and
    /// `STATE_RECORDER_ON_FAILURE`. Values a recorder would reject (a zero
    /// port or timeout, an unknown policy) are logged and ignored.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(enabled) = lookup("STATE_RECORDER_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "true" | "1" => self.enabled = true,
                "false" | "0" => self.enabled = false,
                _ => warn!("Invalid STATE_RECORDER_ENABLED value: {}", enabled),
            }
        }

        if let Some(host) = lookup("STATE_RECORDER_HOST") {
            self.settings.insert(SETTING_HOST.to_string(), host);
        }

        if let Some(port) = lookup("STATE_RECORDER_PORT") {
            match port.trim().parse::<u16>() {
                Ok(p) if p != 0 => {
                    self.settings.insert(SETTING_PORT.to_string(), port);
                }
                _ => warn!("Invalid STATE_RECORDER_PORT value: {}", port),
            }
        }

        if let Some(timeout) = lookup("STATE_RECORDER_TIMEOUT_MS") {
            match timeout.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => {
                    self.settings.insert(SETTING_TIMEOUT_MS.to_string(), timeout);
                }
                _ => warn!("Invalid STATE_RECORDER_TIMEOUT_MS value: {}", timeout),
            }
        }

        if let Some(policy) = lookup("STATE_RECORDER_ON_FAILURE") {
            if policy.parse::<FailurePolicy>().is_ok() {
                self.settings.insert(SETTING_ON_FAILURE.to_string(), policy);
            } else {
                warn!("Invalid STATE_RECORDER_ON_FAILURE value: {}", policy);
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = default_config();
        assert_eq!(config.name, "stateRecorder");
        assert!(config.enabled);
        assert_eq!(config.setting(SETTING_HOST), Some(""));
        assert_eq!(config.setting(SETTING_PORT), None);
    }

    #[test]
    fn test_from_json_str() {
        let config = ServiceConfig::from_json_str(
            r#"{"enabled": false, "settings": {"host": "collector", "port": "9090"}}"#,
        )
        .unwrap();

        assert_eq!(config.name, "stateRecorder");
        assert!(!config.enabled);
        assert_eq!(config.setting("host"), Some("collector"));
        assert_eq!(config.setting("port"), Some("9090"));
    }

    #[test]
    fn test_from_yaml_str() {
        let config = ServiceConfig::from_yaml_str(
            "name: recorder\nsettings:\n  host: http://collector.local\n  port: \"8080\"\n",
        )
        .unwrap();

        assert_eq!(config.name, "recorder");
        assert!(config.enabled);
        assert_eq!(config.setting("host"), Some("http://collector.local"));
    }

    #[test]
    fn test_invalid_json_is_configuration_error() {
        let err = ServiceConfig::from_json_str("{not json").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recorder.yml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "enabled: true\nsettings:\n  host: collector\n  port: \"7777\"").unwrap();

        let config = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(config.setting("port"), Some("7777"));

        let txt = dir.path().join("recorder.txt");
        std::fs::write(&txt, "host=collector").unwrap();
        assert!(ServiceConfig::from_file(&txt).unwrap_err().is_configuration());
    }

    #[test]
    fn test_overrides() {
        let vars = HashMap::from([
            ("STATE_RECORDER_ENABLED", "false"),
            ("STATE_RECORDER_HOST", "collector.internal"),
            ("STATE_RECORDER_PORT", "not-a-port"),
            ("STATE_RECORDER_TIMEOUT_MS", "1500"),
            ("STATE_RECORDER_ON_FAILURE", "propagate"),
        ]);

        let config = default_config()
            .with_setting(SETTING_PORT, "8080")
            .with_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert!(!config.enabled);
        assert_eq!(config.setting(SETTING_HOST), Some("collector.internal"));
        // invalid port is ignored
        assert_eq!(config.setting(SETTING_PORT), Some("8080"));
        assert_eq!(config.setting(SETTING_TIMEOUT_MS), Some("1500"));
        assert_eq!(config.setting(SETTING_ON_FAILURE), Some("propagate"));
    }

    #[test]
    fn test_rejected_overrides_keep_file_values() {
        let vars = HashMap::from([
            ("STATE_RECORDER_PORT", "0"),
            ("STATE_RECORDER_TIMEOUT_MS", "0"),
            ("STATE_RECORDER_ON_FAILURE", "retry"),
            ("STATE_RECORDER_ENABLED", "maybe"),
        ]);

        let config = default_config()
            .with_setting(SETTING_HOST, "collector")
            .with_setting(SETTING_PORT, "8080")
            .with_setting(SETTING_ON_FAILURE, "ignore")
            .with_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert!(config.enabled);
        assert_eq!(config.setting(SETTING_PORT), Some("8080"));
        assert_eq!(config.setting(SETTING_TIMEOUT_MS), None);
        assert_eq!(config.setting(SETTING_ON_FAILURE), Some("ignore"));
    }
}
