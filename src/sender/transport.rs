use super::client::HttpClient;
use super::payload::BatchPayload;
use crate::buffer::Batch;
use rand::Rng;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid transport configuration: {0}")]
    InvalidConfig(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Backoff policy for failed delivery attempts on a single batch.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Delay inserted after the given failed attempt index:
    /// `base_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponential = self
            .base_delay
            .saturating_mul(2_u32.saturating_pow(attempt));
        let capped = exponential.min(self.max_delay);
        if self.jitter {
            apply_jitter(capped)
        } else {
            capped
        }
    }
}

fn apply_jitter(delay: Duration) -> Duration {
    let mut rng = rand::rng();
    let factor = rng.random_range(0.5..1.5);
    Duration::from_millis((delay.as_millis() as f64 * factor) as u64)
}

/// Delivery engine: ships one batch per call, retrying with exponential
/// backoff, and drops the batch silently once attempts are exhausted.
/// Loss under sustained outage is accepted; surfacing the failure to the
/// host is not.
#[derive(Debug, Clone)]
pub struct Transport {
    http: HttpClient,
    project_id: String,
    retry: RetryConfig,
}

impl Transport {
    pub fn new(http: HttpClient, project_id: String, retry: RetryConfig) -> Self {
        Self {
            http,
            project_id,
            retry,
        }
    }

    /// Deliver one batch. An empty batch performs no network action and
    /// is not counted as an attempt. Never returns an error; the outcome
    /// is observable only through `tracing` diagnostics.
    pub async fn send_batch(&self, batch: Batch) {
        if batch.is_empty() {
            return;
        }

        let payload = BatchPayload {
            project_id: &self.project_id,
            logs: batch.records(),
        };
        let body = match serde_json::to_vec(&payload) {
            Ok(body) => body,
            Err(error) => {
                warn!(batch_id = %batch.id(), %error, "failed to serialize batch; dropping");
                return;
            }
        };

        let mut last_error = None;
        for attempt in 0..self.retry.max_attempts {
            match self.attempt(body.clone()).await {
                Ok(()) => {
                    debug!(
                        batch_id = %batch.id(),
                        records = batch.len(),
                        attempt,
                        "batch delivered"
                    );
                    return;
                }
                Err(error) => {
                    warn!(
                        batch_id = %batch.id(),
                        attempt,
                        %error,
                        "delivery attempt failed"
                    );
                    last_error = Some(error);
                }
            }

            if attempt + 1 < self.retry.max_attempts {
                sleep(self.retry.delay_for(attempt)).await;
            }
        }

        warn!(
            batch_id = %batch.id(),
            records = batch.len(),
            age = ?batch.created_at().elapsed(),
            error = ?last_error,
            "dropping batch after exhausting retry attempts"
        );
    }

    async fn attempt(&self, body: Vec<u8>) -> Result<(), TransportError> {
        let response = self.http.post_logs(body).await?;
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status().as_u16();
        // Body captured for diagnostics only, never surfaced to callers.
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Http { status, body })
    }
}
