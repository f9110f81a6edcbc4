//! Structured logging for markbot.
//!
//! Handles console/NDJSON output, bot-token redaction, and per-request event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{RequestEvent, RequestEventEntry, RequestEventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
