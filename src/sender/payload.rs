use crate::domain::LogRecord;
use serde::Serialize;

/// Wire payload for one batch delivery: `POST {endpoint}/v1/logs`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayload<'a> {
    pub project_id: &'a str,
    pub logs: &'a [LogRecord],
}
