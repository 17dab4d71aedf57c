use crate::config::Config;
use crate::domain::{LogLevel, LogOptions, LogRecord};
use chrono::Utc;

/// Build a fully-populated record from a caller-supplied partial entry
/// plus ambient client state. The user and session values are snapshots:
/// mutating them later never rewrites a record built here.
pub(crate) fn build_record(
    config: &Config,
    user_id: Option<String>,
    session_id: Option<String>,
    level: LogLevel,
    options: LogOptions,
) -> LogRecord {
    let mut tags = config.default_tags.clone();
    if let Some(call_site) = options.tags {
        // Call-site tags win on key collision.
        tags.extend(call_site);
    }

    LogRecord {
        level,
        bucket: options.bucket,
        message: options.message,
        timestamp: Utc::now().timestamp_millis(),
        context: options.context,
        tags,
        trace_id: options.trace_id,
        user_id,
        session_id,
        env: non_empty(&config.env),
        app_name: non_empty(&config.app_name),
        app_version: non_empty(&config.app_version),
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
