mod common;

use common::{init_diagnostics, logs_of, test_options, wait_for_requests};
use gunsole_sdk::{ClientOptions, ConfigError, GunsoleClient, LogOptions, Mode, UserInfo};
use std::collections::HashMap;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_ingest() -> MockServer {
    init_diagnostics();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/logs"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

fn entry(message: &str) -> LogOptions {
    LogOptions {
        bucket: "test".to_string(),
        message: message.to_string(),
        ..LogOptions::default()
    }
}

#[test]
fn construction_outside_a_runtime_fails_with_config_error() {
    let result = GunsoleClient::new(ClientOptions::new("proj", "key", Mode::Local));
    assert!(matches!(result, Err(ConfigError::Runtime(_))));
}

#[tokio::test]
async fn reaching_batch_size_triggers_an_immediate_flush_in_order() {
    let server = mock_ingest().await;
    let mut options = test_options(&server);
    options.batch_size = Some(3);
    // Long interval so only the size trigger can fire here.
    options.flush_interval = Some(Duration::from_secs(60));
    let client = GunsoleClient::new(options).unwrap();

    client.info(entry("one"));
    client.info(entry("two"));
    client.info(entry("three"));

    let requests = wait_for_requests(&server, 1, Duration::from_secs(2)).await;
    assert_eq!(requests.len(), 1);
    let logs = logs_of(&requests[0]);
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0]["message"], "one");
    assert_eq!(logs[1]["message"], "two");
    assert_eq!(logs[2]["message"], "three");
}

#[tokio::test]
async fn timer_flushes_a_partial_batch() {
    let server = mock_ingest().await;
    let mut options = test_options(&server);
    options.batch_size = Some(100);
    options.flush_interval = Some(Duration::from_millis(100));
    let client = GunsoleClient::new(options).unwrap();

    client.warn(entry("only one"));

    let requests = wait_for_requests(&server, 1, Duration::from_secs(2)).await;
    assert_eq!(requests.len(), 1);
    let logs = logs_of(&requests[0]);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["level"], "warn");
}

#[tokio::test]
async fn explicit_flush_delivers_pending_records() {
    let server = mock_ingest().await;
    let mut options = test_options(&server);
    options.batch_size = Some(100);
    options.flush_interval = Some(Duration::from_secs(60));
    let client = GunsoleClient::new(options).unwrap();

    client.info(entry("a"));
    client.error(entry("b"));
    client.flush().await;

    let requests = wait_for_requests(&server, 1, Duration::from_secs(2)).await;
    assert_eq!(requests.len(), 1);
    let logs = logs_of(&requests[0]);
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[1]["level"], "error");
}

#[tokio::test]
async fn default_and_call_site_tags_merge_with_call_site_winning() {
    let server = mock_ingest().await;
    let mut options = test_options(&server);
    options.batch_size = Some(100);
    options.flush_interval = Some(Duration::from_secs(60));
    options.default_tags = HashMap::from([
        ("env".to_string(), "test".to_string()),
        ("region".to_string(), "us-east".to_string()),
    ]);
    let client = GunsoleClient::new(options).unwrap();

    client.info(LogOptions {
        bucket: "b".to_string(),
        message: "m".to_string(),
        tags: Some(HashMap::from([
            ("env".to_string(), "prod".to_string()),
            ("feature".to_string(), "auth".to_string()),
        ])),
        ..LogOptions::default()
    });
    client.flush().await;

    let requests = wait_for_requests(&server, 1, Duration::from_secs(2)).await;
    let logs = logs_of(&requests[0]);
    assert_eq!(logs[0]["tags"]["env"], "prod");
    assert_eq!(logs[0]["tags"]["region"], "us-east");
    assert_eq!(logs[0]["tags"]["feature"], "auth");
}

#[tokio::test]
async fn user_and_session_are_snapshotted_per_record() {
    let server = mock_ingest().await;
    let mut options = test_options(&server);
    options.batch_size = Some(100);
    options.flush_interval = Some(Duration::from_secs(60));
    let client = GunsoleClient::new(options).unwrap();

    client.set_user(UserInfo::new("user-123"));
    client.set_session_id("session-1");
    client.info(entry("as first user"));

    client.set_user(UserInfo::new("user-456"));
    client.info(entry("as second user"));
    client.flush().await;

    let requests = wait_for_requests(&server, 1, Duration::from_secs(2)).await;
    let logs = logs_of(&requests[0]);
    assert_eq!(logs[0]["userId"], "user-123");
    assert_eq!(logs[0]["sessionId"], "session-1");
    assert_eq!(logs[1]["userId"], "user-456");
}

#[tokio::test]
async fn logging_never_panics_for_degenerate_input() {
    let server = mock_ingest().await;
    let mut options = test_options(&server);
    options.batch_size = Some(100);
    let client = GunsoleClient::new(options).unwrap();

    client.info(LogOptions::default());
    client.debug(entry(""));
    client.error(LogOptions {
        bucket: String::new(),
        message: "\u{0}\u{FFFF} weird".repeat(1000),
        ..LogOptions::default()
    });
    client.flush().await;
}

#[tokio::test]
async fn destroy_stops_the_timer_and_issues_one_final_flush() {
    let server = mock_ingest().await;
    let mut options = test_options(&server);
    options.batch_size = Some(100);
    options.flush_interval = Some(Duration::from_millis(100));
    let client = GunsoleClient::new(options).unwrap();

    client.info(entry("last words"));
    client.destroy();

    let requests = wait_for_requests(&server, 1, Duration::from_secs(2)).await;
    assert_eq!(requests.len(), 1);
    assert_eq!(logs_of(&requests[0]).len(), 1);

    // Post-destruction operations are silent no-ops; the stopped timer
    // must not produce further deliveries.
    client.info(entry("into the void"));
    client.flush().await;
    client.destroy();
    tokio::time::sleep(Duration::from_millis(350)).await;
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn delivery_failure_is_invisible_to_the_caller() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut options = test_options(&server);
    options.batch_size = Some(1);
    let client = GunsoleClient::new(options).unwrap();

    // Size trigger fires a delivery that will exhaust its retries; the
    // caller sees nothing either way.
    client.info(entry("lost to the outage"));
    client.flush().await;

    let requests = wait_for_requests(&server, 3, Duration::from_secs(2)).await;
    assert_eq!(requests.len(), 3);
}
