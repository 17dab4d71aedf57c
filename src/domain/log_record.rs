use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Caller-supplied partial entry accepted by the logging methods.
///
/// Only `bucket` and `message` are expected; both may be empty strings.
/// Everything else is optional and filled in (or merged) by enrichment.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Free-form categorical label, used for filtering and grouping.
    pub bucket: String,
    /// Human-readable message.
    pub message: String,
    /// Additional structured context attached to this record.
    pub context: Option<Map<String, Value>>,
    /// Call-site tags; these win over configured default tags on collision.
    pub tags: Option<HashMap<String, String>>,
    /// Trace ID for distributed tracing.
    pub trace_id: Option<String>,
}

/// A fully enriched log record ready for batching and delivery.
///
/// This is the canonical representation of an entry throughout the
/// pipeline, from enrichment through the batch buffer to the transport.
/// Records are immutable once enqueued; user or session changes after
/// enqueue never rewrite them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub level: LogLevel,
    pub bucket: String,
    pub message: String,
    /// Wall-clock capture at enqueue time, Unix milliseconds.
    pub timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
    /// Default tags overlaid by call-site tags; call-site wins on collision.
    pub tags: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,

    // Snapshots of ambient client state at enqueue time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}
