//! MIME type detection for media files.
//!
//! Used by the `stamp` command to pick the image or video path for a local file.

use markbot_core::MediaKind;
use std::path::Path;

/// Detect MIME type by file extension.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png"          => "image/png",
        "gif"          => "image/gif",
        "webp"         => "image/webp",
        "bmp"          => "image/bmp",
        "tiff" | "tif" => "image/tiff",

        // Video
        "mp4"          => "video/mp4",
        "webm"         => "video/webm",
        "mkv"          => "video/x-matroska",
        "mov"          => "video/quicktime",
        "avi"          => "video/x-msvideo",

        _              => "application/octet-stream",
    }
}

/// Whether a MIME type is for an image.
pub fn is_image(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// Whether a MIME type is for video.
pub fn is_video(mime: &str) -> bool {
    mime.starts_with("video/")
}

/// Map a file to the pipeline that can watermark it.
pub fn detect_media_kind(path: &Path) -> Option<MediaKind> {
    let mime = detect_mime_type(path);
    if is_image(mime) {
        Some(MediaKind::Photo)
    } else if is_video(mime) {
        Some(MediaKind::Video)
    } else {
        None
    }
}
