//! Config defaults: applies the built-in values to a parsed config.

use markbot_core::{DEFAULT_PHOTO_MAX_BYTES, DEFAULT_VIDEO_MAX_BYTES};

use crate::schema::{LoggingConfig, MarkbotConfig, MediaConfig, TelegramConfig};

/// Public Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Watermark asset expected next to the binary's working directory.
pub const DEFAULT_WATERMARK_PATH: &str = "./watermark.png";

/// Working directory for downloaded and watermarked files.
pub const DEFAULT_DOWNLOADS_DIR: &str = "./downloads";

/// Wall-clock limit for a single file download (5 minutes).
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";
pub const DEFAULT_FFPROBE_PATH: &str = "ffprobe";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: MarkbotConfig) -> MarkbotConfig {
    let config = apply_telegram_defaults(config);
    let config = apply_media_defaults(config);
    apply_logging_defaults(config)
}

/// The token has no default; only the endpoint is filled in.
fn apply_telegram_defaults(mut config: MarkbotConfig) -> MarkbotConfig {
    let telegram = config.telegram.get_or_insert_with(TelegramConfig::default);
    if telegram.api_url.is_none() {
        telegram.api_url = Some(DEFAULT_API_URL.to_string());
    }
    config
}

fn apply_media_defaults(mut config: MarkbotConfig) -> MarkbotConfig {
    let media = config.media.get_or_insert_with(MediaConfig::default);
    media
        .watermark_path
        .get_or_insert_with(|| DEFAULT_WATERMARK_PATH.to_string());
    media
        .downloads_dir
        .get_or_insert_with(|| DEFAULT_DOWNLOADS_DIR.to_string());
    media.photo_max_bytes.get_or_insert(DEFAULT_PHOTO_MAX_BYTES);
    media.video_max_bytes.get_or_insert(DEFAULT_VIDEO_MAX_BYTES);
    media
        .download_timeout_secs
        .get_or_insert(DEFAULT_DOWNLOAD_TIMEOUT_SECS);
    media
        .ffmpeg_path
        .get_or_insert_with(|| DEFAULT_FFMPEG_PATH.to_string());
    media
        .ffprobe_path
        .get_or_insert_with(|| DEFAULT_FFPROBE_PATH.to_string());
    config
}

fn apply_logging_defaults(mut config: MarkbotConfig) -> MarkbotConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    config
}
