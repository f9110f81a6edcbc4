//! Config validation: checks with user-friendly error messages.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::schema::MarkbotConfig;

/// Shape of a Bot API token: `<bot id>:<secret>`.
static BOT_TOKEN_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+:[A-Za-z0-9_-]{30,}$").unwrap());

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &MarkbotConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_telegram(config, &mut report);
    validate_media(config, &mut report);
    validate_logging(config, &mut report);
    report
}

/// The bot cannot start without a token.
fn validate_telegram(config: &MarkbotConfig, report: &mut ValidationReport) {
    let token = config
        .telegram
        .as_ref()
        .and_then(|t| t.bot_token.as_deref())
        .map(str::trim)
        .unwrap_or("");
    if token.is_empty() {
        report.error(
            "telegram.botToken",
            "Bot token is required; set BOT_TOKEN or telegram.botToken",
        );
    } else if !BOT_TOKEN_SHAPE.is_match(token) {
        report.warn(
            "telegram.botToken",
            "Bot token does not look like '<id>:<secret>'; Telegram will probably reject it",
        );
    }

    if let Some(url) = config.telegram.as_ref().and_then(|t| t.api_url.as_deref()) {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            report.error("telegram.apiUrl", format!("'{url}' is not an http(s) URL"));
        }
    }
}

fn validate_media(config: &MarkbotConfig, report: &mut ValidationReport) {
    let Some(media) = &config.media else { return };
    if media.photo_max_bytes == Some(0) {
        report.error("media.photoMaxBytes", "photoMaxBytes must be >= 1");
    }
    if media.video_max_bytes == Some(0) {
        report.error("media.videoMaxBytes", "videoMaxBytes must be >= 1");
    }
    if media.download_timeout_secs == Some(0) {
        report.error("media.downloadTimeoutSecs", "downloadTimeoutSecs must be >= 1");
    }
    for (path, value) in [
        ("media.watermarkPath", &media.watermark_path),
        ("media.downloadsDir", &media.downloads_dir),
        ("media.ffmpegPath", &media.ffmpeg_path),
        ("media.ffprobePath", &media.ffprobe_path),
    ] {
        if value.as_deref().map(|v| v.trim().is_empty()).unwrap_or(false) {
            report.error(path, "Path cannot be empty");
        }
    }
}

fn validate_logging(config: &MarkbotConfig, report: &mut ValidationReport) {
    let Some(level) = config.logging.as_ref().and_then(|l| l.level.as_deref()) else {
        return;
    };
    if !matches!(
        level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        report.warn(
            "logging.level",
            format!("Unknown log level '{level}'; it will be parsed as an EnvFilter directive"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;
    use crate::schema::{MediaConfig, TelegramConfig};

    const TOKEN: &str = "123456789:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw1";

    fn with_token(token: &str) -> MarkbotConfig {
        apply_all_defaults(MarkbotConfig {
            telegram: Some(TelegramConfig {
                bot_token: Some(token.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    #[test]
    fn defaults_with_token_are_valid() {
        let report = validate(&with_token(TOKEN));
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    }

    #[test]
    fn missing_token_is_error() {
        let report = validate(&apply_all_defaults(MarkbotConfig::default()));
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "telegram.botToken");
    }

    #[test]
    fn blank_token_is_error() {
        assert!(!validate(&with_token("   ")).is_valid());
    }

    #[test]
    fn odd_token_shape_only_warns() {
        let report = validate(&with_token("not-a-token"));
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn zero_ceiling_is_error() {
        let mut cfg = with_token(TOKEN);
        cfg.media = Some(MediaConfig {
            photo_max_bytes: Some(0),
            ..cfg.media.unwrap()
        });
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert!(report.errors[0].path.contains("photoMaxBytes"));
    }
}
