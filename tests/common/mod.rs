use gunsole_sdk::{ClientOptions, LogLevel, LogRecord, Mode, RetryConfig};
use std::collections::HashMap;
use std::time::Duration;
use wiremock::{MockServer, Request};

/// Route the SDK's internal diagnostics into the test output. Safe to
/// call from every test; only the first initialization wins.
#[allow(dead_code)]
pub fn init_diagnostics() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Retry policy scaled down so backoff-sensitive tests finish quickly
/// while keeping the base-then-double shape.
#[allow(dead_code)]
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        base_delay: Duration::from_millis(25),
        max_delay: Duration::from_secs(30),
        jitter: false,
    }
}

/// Client options pointed at a mock server, with fast retry and a short
/// flush interval unless a test overrides them.
#[allow(dead_code)]
pub fn test_options(server: &MockServer) -> ClientOptions {
    let mut options = ClientOptions::new("proj-1", "test-key", Mode::Local);
    options.endpoint = Some(server.uri());
    options.flush_interval = Some(Duration::from_millis(100));
    options.transport.retry = fast_retry();
    options
}

#[allow(dead_code)]
pub fn record(message: &str) -> LogRecord {
    LogRecord {
        level: LogLevel::Info,
        bucket: "test".to_string(),
        message: message.to_string(),
        timestamp: 1_700_000_000_000,
        context: None,
        tags: HashMap::new(),
        trace_id: None,
        user_id: None,
        session_id: None,
        env: None,
        app_name: None,
        app_version: None,
    }
}

/// Poll the mock server until it has received at least `expected`
/// requests or the timeout elapses; returns whatever was received.
#[allow(dead_code)]
pub async fn wait_for_requests(
    server: &MockServer,
    expected: usize,
    timeout: Duration,
) -> Vec<Request> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let received = server.received_requests().await.unwrap_or_default();
        if received.len() >= expected || tokio::time::Instant::now() >= deadline {
            return received;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Deserialized `logs` array of one delivery request body.
#[allow(dead_code)]
pub fn logs_of(request: &Request) -> Vec<serde_json::Value> {
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    body["logs"].as_array().unwrap().clone()
}
