//! Mock state collector backed by wiremock.
//!
//! Only requests that are `POST` with `Content-Type: application/json`
//! match the mounted responses; anything else gets wiremock's default 404.

use cascade_recorder::ServiceConfig;
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mock remote collector for recorder tests
pub struct MockCollector {
    server: MockServer,
}

impl MockCollector {
    /// Start a collector on a random local port
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL, including scheme and port
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn address(&self) -> SocketAddr {
        *self.server.address()
    }

    /// Recorder config using a bare host plus a `port` setting
    pub fn config(&self) -> ServiceConfig {
        let address = self.address();
        ServiceConfig::default()
            .with_setting("host", address.ip().to_string())
            .with_setting("port", address.port().to_string())
    }

    /// Recorder config using the full URL as host and no `port` setting
    pub fn url_config(&self) -> ServiceConfig {
        ServiceConfig::default().with_setting("host", self.uri())
    }

    /// Answer JSON posts to `record_path` with `status`, expecting exactly
    /// `expected_calls` of them
    pub async fn respond_with_status(&self, record_path: &str, status: u16, expected_calls: u64) {
        Self::record_post(record_path)
            .respond_with(ResponseTemplate::new(status))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Answer JSON posts to `record_path` with `status` and a text body
    pub async fn respond_with_body(&self, record_path: &str, status: u16, body: &str) {
        Self::record_post(record_path)
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Answer JSON posts to `record_path` with 200 after `delay`
    pub async fn respond_after(&self, record_path: &str, delay: Duration) {
        Self::record_post(record_path)
            .respond_with(ResponseTemplate::new(200).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    /// Bodies of every request received on `record_path`, in arrival order
    pub async fn received_json(&self, record_path: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == record_path)
            .map(|request| {
                serde_json::from_slice(&request.body).expect("collector received a non-JSON body")
            })
            .collect()
    }

    /// The underlying mock server, for custom expectations
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    fn record_post(record_path: &str) -> wiremock::MockBuilder {
        Mock::given(method("POST"))
            .and(path(record_path))
            .and(header("content-type", "application/json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_configs_point_at_the_server() {
        let collector = MockCollector::start().await;
        let address = collector.address();

        let config = collector.config();
        assert_eq!(config.setting("host"), Some(address.ip().to_string().as_str()));
        assert_eq!(config.setting("port"), Some(address.port().to_string().as_str()));

        let config = collector.url_config();
        assert_eq!(config.setting("host"), Some(collector.uri().as_str()));
        assert_eq!(config.setting("port"), None);
    }

    #[tokio::test]
    async fn test_no_requests_means_no_bodies() {
        let collector = MockCollector::start().await;
        assert!(collector.received_json("/instances/steps").await.is_empty());
    }
}
