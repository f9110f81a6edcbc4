//! Log Redaction Layer
//!
//! Scrubs Telegram bot tokens and bearer tokens from strings prior to logging.
//! File download URLs embed the token (`/file/bot<token>/...`), and `reqwest`
//! errors echo the URL, so anything touching them goes through here.

use regex::Regex;
use std::sync::LazyLock;

static BOT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{5,}:[A-Za-z0-9_-]{30,}").unwrap());
static URL_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/bot[^/\s]+/").unwrap());
static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let mut redacted = URL_TOKEN_RE
        .replace_all(input, "/bot[REDACTED_TOKEN]/")
        .to_string();
    redacted = BOT_TOKEN_RE
        .replace_all(&redacted, "[REDACTED_TOKEN]")
        .to_string();
    redacted = BEARER_RE
        .replace_all(&redacted, "Bearer [REDACTED_TOKEN]")
        .to_string();
    redacted
}
