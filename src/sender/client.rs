use super::transport::{RetryConfig, TransportError};
use reqwest::{Client, ClientBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use url::Url;

const DEFAULT_USER_AGENT: &str = concat!("gunsole-sdk/", env!("CARGO_PKG_VERSION"));

/// Tuning for the underlying HTTP client and retry policy.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub connection_timeout: Duration,
    pub max_connections: usize,
    pub keep_alive_timeout: Duration,
    pub user_agent: String,
    pub retry: RetryConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            max_connections: 20,
            keep_alive_timeout: Duration::from_secs(60),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryConfig::default(),
        }
    }
}

/// Pooled HTTP client bound to one ingestion endpoint.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    ingest_url: Url,
    api_key: String,
}

impl HttpClient {
    pub fn new(
        endpoint: &str,
        api_key: String,
        config: &TransportConfig,
    ) -> Result<Self, TransportError> {
        let endpoint_url: Url = endpoint
            .parse()
            .map_err(|e| TransportError::InvalidConfig(format!("Invalid endpoint URL: {e}")))?;

        let ingest_url = if endpoint.ends_with("/v1/logs") {
            endpoint_url
        } else {
            let mut url = endpoint_url;
            let base = url.path().trim_end_matches('/').to_string();
            url.set_path(&format!("{base}/v1/logs"));
            url
        };

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connection_timeout)
            .pool_max_idle_per_host(config.max_connections)
            .pool_idle_timeout(config.keep_alive_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                TransportError::InvalidConfig(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            ingest_url,
            api_key,
        })
    }

    pub fn ingest_url(&self) -> &Url {
        &self.ingest_url
    }

    /// Issue one delivery request. Status handling is the transport's job;
    /// this only surfaces connection-level failures as errors.
    pub async fn post_logs(&self, body: Vec<u8>) -> Result<Response, TransportError> {
        self.client
            .post(self.ingest_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .body(body)
            .send()
            .await
            .map_err(TransportError::from)
    }
}
