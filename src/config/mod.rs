mod validation;

use crate::sender::TransportConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("projectId is required")]
    MissingProjectId,
    #[error("apiKey is required")]
    MissingApiKey,
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Client mode; determines the default ingestion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Desktop,
    Local,
    #[default]
    Cloud,
}

/// Default endpoint for local development modes (desktop/local).
pub const LOCAL_ENDPOINT: &str = "http://localhost:8787";
/// Default endpoint for the hosted service.
pub const CLOUD_ENDPOINT: &str = "https://api.gunsole.com";

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(5000);

/// Caller-supplied configuration request. Resolved into a [`Config`]
/// before a client can be constructed.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub project_id: String,
    pub api_key: String,
    pub mode: Mode,
    /// Explicit endpoint override; wins over the mode default.
    pub endpoint: Option<String>,
    pub env: Option<String>,
    pub app_name: Option<String>,
    pub app_version: Option<String>,
    /// Tags applied to every record; call-site tags win on collision.
    pub default_tags: HashMap<String, String>,
    pub batch_size: Option<usize>,
    pub flush_interval: Option<Duration>,
    pub transport: TransportConfig,
}

impl ClientOptions {
    pub fn new(project_id: impl Into<String>, api_key: impl Into<String>, mode: Mode) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: api_key.into(),
            mode,
            ..Self::default()
        }
    }
}

/// Fully-resolved client configuration. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_id: String,
    pub api_key: String,
    pub mode: Mode,
    pub endpoint: String,
    pub env: String,
    pub app_name: String,
    pub app_version: String,
    pub default_tags: HashMap<String, String>,
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub transport: TransportConfig,
}

/// Resolve the ingestion endpoint from the mode unless an explicit
/// override is given.
pub fn resolve_endpoint(mode: Mode, custom_endpoint: Option<&str>) -> String {
    if let Some(endpoint) = custom_endpoint {
        return endpoint.to_string();
    }
    match mode {
        Mode::Desktop | Mode::Local => LOCAL_ENDPOINT.to_string(),
        Mode::Cloud => CLOUD_ENDPOINT.to_string(),
    }
}
