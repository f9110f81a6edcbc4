//! Resolved runtime settings.

use anyhow::{anyhow, Result};
use markbot_core::SizeLimits;
use std::path::PathBuf;
use std::time::Duration;

use crate::defaults::{
    DEFAULT_API_URL, DEFAULT_DOWNLOADS_DIR, DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_FFMPEG_PATH,
    DEFAULT_FFPROBE_PATH, DEFAULT_LOG_LEVEL, DEFAULT_WATERMARK_PATH,
};
use crate::schema::MarkbotConfig;

/// Everything the bot needs at runtime, with no optional gaps left.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bot_token: String,
    pub api_url: String,
    pub watermark_path: PathBuf,
    pub downloads_dir: PathBuf,
    pub limits: SizeLimits,
    pub download_timeout: Duration,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Settings {
    /// Build settings from a config that has been through defaults and validation.
    pub fn from_config(config: &MarkbotConfig) -> Result<Self> {
        let telegram = config.telegram.clone().unwrap_or_default();
        let media = config.media.clone().unwrap_or_default();

        let bot_token = telegram
            .bot_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("Bot token is required; set BOT_TOKEN or telegram.botToken"))?;

        let tools = MediaSettings::from_config(config);
        let log = LogSettings::from_config(config);
        let defaults = SizeLimits::default();
        Ok(Self {
            bot_token,
            api_url: telegram
                .api_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            watermark_path: tools.watermark_path,
            downloads_dir: PathBuf::from(
                media
                    .downloads_dir
                    .unwrap_or_else(|| DEFAULT_DOWNLOADS_DIR.to_string()),
            ),
            limits: SizeLimits {
                photo_max_bytes: media.photo_max_bytes.unwrap_or(defaults.photo_max_bytes),
                video_max_bytes: media.video_max_bytes.unwrap_or(defaults.video_max_bytes),
            },
            download_timeout: Duration::from_secs(
                media
                    .download_timeout_secs
                    .unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            ),
            ffmpeg_path: tools.ffmpeg_path,
            ffprobe_path: tools.ffprobe_path,
            log_level: log.level,
            log_dir: log.dir,
        })
    }
}

/// The watermark asset and transcoder binaries. Needs no bot token, so
/// `markbot stamp` can use it on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSettings {
    pub watermark_path: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
}

impl MediaSettings {
    pub fn from_config(config: &MarkbotConfig) -> Self {
        let media = config.media.clone().unwrap_or_default();
        Self {
            watermark_path: PathBuf::from(
                media
                    .watermark_path
                    .unwrap_or_else(|| DEFAULT_WATERMARK_PATH.to_string()),
            ),
            ffmpeg_path: media
                .ffmpeg_path
                .unwrap_or_else(|| DEFAULT_FFMPEG_PATH.to_string()),
            ffprobe_path: media
                .ffprobe_path
                .unwrap_or_else(|| DEFAULT_FFPROBE_PATH.to_string()),
        }
    }
}

/// Logger options, readable before validation so the logger can be up
/// when validation reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub dir: Option<PathBuf>,
}

impl LogSettings {
    pub fn from_config(config: &MarkbotConfig) -> Self {
        let logging = config.logging.clone().unwrap_or_default();
        Self {
            level: logging
                .level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            dir: logging.dir.map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;
    use crate::schema::TelegramConfig;

    #[test]
    fn resolves_defaults() {
        let cfg = apply_all_defaults(MarkbotConfig {
            telegram: Some(TelegramConfig {
                bot_token: Some(" 1:abc ".to_string()),
                api_url: Some("http://localhost:8081/".to_string()),
            }),
            ..Default::default()
        });
        let settings = Settings::from_config(&cfg).unwrap();
        assert_eq!(settings.bot_token, "1:abc");
        assert_eq!(settings.api_url, "http://localhost:8081");
        assert_eq!(settings.download_timeout, Duration::from_secs(300));
        assert_eq!(settings.limits, SizeLimits::default());
        assert_eq!(settings.watermark_path, PathBuf::from("./watermark.png"));
        assert!(settings.log_dir.is_none());
    }

    #[test]
    fn media_settings_need_no_token() {
        let cfg = apply_all_defaults(MarkbotConfig::default());
        let media = MediaSettings::from_config(&cfg);
        assert_eq!(media.watermark_path, PathBuf::from("./watermark.png"));
        assert_eq!(media.ffmpeg_path, "ffmpeg");
        assert_eq!(LogSettings::from_config(&cfg).level, "info");
    }

    #[test]
    fn missing_token_fails() {
        let cfg = apply_all_defaults(MarkbotConfig::default());
        assert!(Settings::from_config(&cfg).is_err());
    }
}
