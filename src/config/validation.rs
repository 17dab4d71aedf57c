use super::{
    ClientOptions, Config, ConfigError, DEFAULT_BATCH_SIZE, DEFAULT_FLUSH_INTERVAL,
    resolve_endpoint,
};
use url::Url;

impl ClientOptions {
    /// Validate the request and fill defaults, producing an immutable
    /// [`Config`]. This is the only fallible step of client construction
    /// besides runtime detection; it runs synchronously so an unusable
    /// configuration can never produce a half-built client.
    pub fn resolve(self) -> Result<Config, ConfigError> {
        if self.project_id.is_empty() {
            return Err(ConfigError::MissingProjectId);
        }
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let endpoint = resolve_endpoint(self.mode, self.endpoint.as_deref());
        Url::parse(&endpoint)
            .map_err(|e| ConfigError::InvalidEndpoint(format!("'{endpoint}': {e}")))?;

        let batch_size = self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        let flush_interval = self.flush_interval.unwrap_or(DEFAULT_FLUSH_INTERVAL);
        if flush_interval.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "Flush interval must be greater than 0".to_string(),
            ));
        }

        if self.transport.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidConfig(
                "Retry max attempts must be greater than 0".to_string(),
            ));
        }

        Ok(Config {
            project_id: self.project_id,
            api_key: self.api_key,
            mode: self.mode,
            endpoint,
            env: self.env.unwrap_or_default(),
            app_name: self.app_name.unwrap_or_default(),
            app_version: self.app_version.unwrap_or_default(),
            default_tags: self.default_tags,
            batch_size,
            flush_interval,
            transport: self.transport,
        })
    }
}
