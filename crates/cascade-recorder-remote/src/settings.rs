//! Parsing and normalization of remote recorder settings

use cascade_recorder::config::{
    SETTING_CONNECT_TIMEOUT_MS, SETTING_HOST, SETTING_ON_FAILURE, SETTING_PORT, SETTING_TIMEOUT_MS,
};
use cascade_recorder::{FailurePolicy, RecorderError, RecorderResult};
use reqwest::Url;
use std::collections::HashMap;
use std::time::Duration;

/// Default whole-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Validated settings of a remote recorder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    /// Normalized collector base URL, without trailing slash
    pub host: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub on_failure: FailurePolicy,
}

impl RemoteSettings {
    /// Validate a raw settings map
    pub fn from_settings(settings: &HashMap<String, String>) -> RecorderResult<Self> {
        let host = settings.get(SETTING_HOST).ok_or_else(|| {
            RecorderError::ConfigurationError("required setting 'host' not set".to_string())
        })?;
        let port = settings.get(SETTING_PORT).map(String::as_str);

        Ok(Self {
            host: normalize_host(host, port)?,
            timeout: parse_millis(settings, SETTING_TIMEOUT_MS)?.unwrap_or(DEFAULT_TIMEOUT),
            connect_timeout: parse_millis(settings, SETTING_CONNECT_TIMEOUT_MS)?
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            on_failure: match settings.get(SETTING_ON_FAILURE) {
                Some(raw) if !raw.trim().is_empty() => raw.parse()?,
                _ => FailurePolicy::default(),
            },
        })
    }
}

/// Build the collector base URL from the `host` and `port` settings
///
/// - a bare hostname needs a port and becomes `http://host:port`
/// - a URL with an `http://` or `https://` scheme gets `:port` appended when a
///   port is given, and is used as-is otherwise
/// - a URL that already names a port (or a path) cannot take another port
/// - a bare hostname cannot carry a path
pub fn normalize_host(host: &str, port: Option<&str>) -> RecorderResult<String> {
    let host = host.trim();
    if host.is_empty() {
        return Err(RecorderError::ConfigurationError(
            "required setting 'host' not set".to_string(),
        ));
    }

    let port = match port.map(str::trim).filter(|p| !p.is_empty()) {
        Some(raw) => Some(parse_port(raw)?),
        None => None,
    };

    let normalized = if has_scheme(host) {
        let base = host.trim_end_matches('/');
        match port {
            Some(port) => {
                let url = parse_url(base)?;
                if url.port().is_some() {
                    return Err(RecorderError::ConfigurationError(format!(
                        "host '{}' already carries a port, remove the 'port' setting",
                        host
                    )));
                }
                if url.path() != "/" {
                    return Err(RecorderError::ConfigurationError(format!(
                        "cannot append port {} to host '{}' with a path",
                        port, host
                    )));
                }
                format!("{}:{}", base, port)
            }
            None => base.to_string(),
        }
    } else {
        if host.contains('/') {
            return Err(RecorderError::ConfigurationError(format!(
                "bare host '{}' cannot carry a path, use an http:// or https:// URL",
                host
            )));
        }
        let port = port.ok_or_else(|| {
            RecorderError::ConfigurationError(format!(
                "setting 'port' is required for bare host '{}'",
                host
            ))
        })?;
        format!("http://{}:{}", host, port)
    };

    parse_url(&normalized)?;
    Ok(normalized)
}

fn has_scheme(host: &str) -> bool {
    let lower = host.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn parse_port(raw: &str) -> RecorderResult<u16> {
    match raw.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(RecorderError::ConfigurationError(format!(
            "invalid port: {}",
            raw
        ))),
    }
}

fn parse_url(raw: &str) -> RecorderResult<Url> {
    Url::parse(raw).map_err(|e| {
        RecorderError::ConfigurationError(format!("invalid collector URL '{}': {}", raw, e))
    })
}

fn parse_millis(settings: &HashMap<String, String>, key: &str) -> RecorderResult<Option<Duration>> {
    match settings.get(key).map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => match raw.parse::<u64>() {
            Ok(ms) if ms > 0 => Ok(Some(Duration::from_millis(ms))),
            _ => Err(RecorderError::ConfigurationError(format!(
                "invalid value for '{}': {}",
                key, raw
            ))),
        },
    }
}
