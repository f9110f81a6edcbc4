//! Request Event Logger
//!
//! One structured event per pipeline stage of a watermarking request.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestEvent {
    Received { media: String, size_preset: String },
    Downloaded { bytes: u64 },
    Processed { output_bytes: u64 },
    Delivered,
    Failed { kind: String, error_msg: String },
}

#[derive(Debug, Serialize)]
pub struct RequestEventEntry {
    pub chat_id: i64,
    pub file_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: RequestEvent,
}

pub struct RequestEventLogger;

impl RequestEventLogger {
    /// Emits a request event under the `request_events` target.
    pub fn log_event(chat_id: i64, file_id: &str, mut event: RequestEvent) {
        if let RequestEvent::Failed { error_msg, .. } = &mut event {
            *error_msg = redact_sensitive_data(error_msg);
        }
        let failed = matches!(event, RequestEvent::Failed { .. });

        let entry = RequestEventEntry {
            chat_id,
            file_id: file_id.into(),
            timestamp: Utc::now(),
            event,
        };
        let payload = serde_json::to_string(&entry).unwrap_or_default();

        if failed {
            warn!(target: "request_events", chat_id, event = %payload, "Request failed");
        } else {
            info!(target: "request_events", chat_id, event = %payload, "Request event");
        }
    }
}
