use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default ceiling for photo uploads (20 MiB).
pub const DEFAULT_PHOTO_MAX_BYTES: u64 = 20 * 1024 * 1024;

/// Default ceiling for video uploads and processed video output (20 MiB).
pub const DEFAULT_VIDEO_MAX_BYTES: u64 = 20 * 1024 * 1024;

/// Top-left offset of the watermark, in pixels, for both images and videos.
pub const WATERMARK_OFFSET: (u32, u32) = (10, 10);

/// Opacity applied to the watermark layer when compositing images.
pub const WATERMARK_OPACITY: f32 = 0.75;

/// Watermark size preset chosen per chat with `/size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkSize {
    Small,
    Medium,
    #[default]
    Large,
}

impl WatermarkSize {
    pub const ALL: [WatermarkSize; 3] = [
        WatermarkSize::Small,
        WatermarkSize::Medium,
        WatermarkSize::Large,
    ];

    /// Fraction of the source width the watermark occupies.
    pub fn scale_factor(self) -> f64 {
        match self {
            WatermarkSize::Large => 0.5,
            WatermarkSize::Medium => 0.25,
            WatermarkSize::Small => 0.1,
        }
    }

    /// Watermark width for a source of `source_width` pixels.
    pub fn watermark_width(self, source_width: u32) -> u32 {
        scaled_width(source_width, self.scale_factor())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WatermarkSize::Small => "small",
            WatermarkSize::Medium => "medium",
            WatermarkSize::Large => "large",
        }
    }
}

/// `round(width × factor)`, never below one pixel.
///
/// Shared by the image and video paths so both round the same way.
pub fn scaled_width(width: u32, factor: f64) -> u32 {
    ((f64::from(width) * factor).round() as u32).max(1)
}

impl fmt::Display for WatermarkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a `/size` argument that is not one of the three literals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown watermark size \"{0}\" (expected small, medium, or large)")]
pub struct UnknownSizeError(pub String);

impl FromStr for WatermarkSize {
    type Err = UnknownSizeError;

    /// Exact literal match; no case folding or prefixes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(WatermarkSize::Small),
            "medium" => Ok(WatermarkSize::Medium),
            "large" => Ok(WatermarkSize::Large),
            other => Err(UnknownSizeError(other.to_string())),
        }
    }
}

/// The two media kinds the bot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Extension used for the local temp files of this kind.
    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Photo => "jpg",
            MediaKind::Video => "mp4",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Photo => f.write_str("photo"),
            MediaKind::Video => f.write_str("video"),
        }
    }
}

/// Upload ceilings, one per media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeLimits {
    pub photo_max_bytes: u64,
    pub video_max_bytes: u64,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            photo_max_bytes: DEFAULT_PHOTO_MAX_BYTES,
            video_max_bytes: DEFAULT_VIDEO_MAX_BYTES,
        }
    }
}

impl SizeLimits {
    pub fn for_kind(&self, kind: MediaKind) -> u64 {
        match kind {
            MediaKind::Photo => self.photo_max_bytes,
            MediaKind::Video => self.video_max_bytes,
        }
    }
}

/// A platform file reference resolved to its size and remote path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub size: u64,
    pub path: String,
}
