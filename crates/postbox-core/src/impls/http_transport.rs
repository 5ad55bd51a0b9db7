//! HttpTransport - reqwest による TransportClient 実装
//!
//! Only the status code matters to the queue; response bodies are ignored.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{StatusCode, TransportError};
use crate::ports::TransportClient;

/// Settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// URL every payload is POSTed to.
    pub endpoint: String,

    /// Sent as `Authorization: Bearer <api_key>` when present.
    pub api_key: Option<String>,

    /// Per-request timeout. An expired request counts as a transient failure.
    pub timeout: Duration,
}

impl HttpTransportConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// POSTs each body as `application/json`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: HttpTransportConfig,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait]
impl TransportClient for HttpTransport {
    async fn deliver(&self, body: &str) -> Result<StatusCode, TransportError> {
        let mut req = self
            .client
            .post(&self.config.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string());

        if let Some(api_key) = &self.config.api_key {
            req = req.bearer_auth(api_key);
        }

        match req.send().await {
            Ok(resp) => Ok(StatusCode::new(resp.status().as_u16())),
            Err(e) if e.is_timeout() => Err(TransportError::Timeout),
            Err(e) => Err(TransportError::Request(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_and_builders() {
        let config = HttpTransportConfig::new("http://localhost:8080/events")
            .with_api_key("secret")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.endpoint, "http://localhost:8080/events");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(5));

        let transport = HttpTransport::new(config).unwrap();
        assert_eq!(transport.endpoint(), "http://localhost:8080/events");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        // port 9 (discard) は通常 listen されていない
        let config = HttpTransportConfig::new("http://127.0.0.1:9/")
            .with_timeout(Duration::from_secs(2));
        let transport = HttpTransport::new(config).unwrap();
        assert!(transport.deliver("{}").await.is_err());
    }
}
