use std::path::Path;

use async_trait::async_trait;
use markbot_core::{StampResult, WatermarkSize};

pub mod cleanup;
pub mod photo;
pub mod mime_detect;
pub mod video;

pub use cleanup::cleanup_files;
pub use photo::ImageWatermarker;
pub use mime_detect::{detect_media_kind, detect_mime_type, is_image, is_video};
pub use video::{VideoWatermarker, VIDEO_SCALE_FACTOR};

/// Overlays the watermark asset on one media file.
#[async_trait]
pub trait WatermarkApplier: Send + Sync {
    /// Read `input`, write the watermarked result to `output`.
    ///
    /// `size` is the chat's preset; appliers may ignore it.
    async fn apply(&self, input: &Path, output: &Path, size: WatermarkSize) -> StampResult<()>;
}
