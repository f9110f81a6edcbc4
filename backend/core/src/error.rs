use thiserror::Error;

use crate::types::MediaKind;

pub type StampResult<T> = Result<T, StampError>;

/// Failure of a single watermarking request.
///
/// Every variant is terminal for its request; nothing retries.
#[derive(Debug, Error)]
pub enum StampError {
    #[error("file too large: {size} bytes exceeds limit of {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("processed output too large: {size} bytes exceeds limit of {limit} bytes")]
    OutputTooLarge { size: u64, limit: u64 },

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    #[error("platform request failed: {0}")]
    Transport(String),
}

impl StampError {
    pub fn processing(message: impl Into<String>) -> Self {
        StampError::ProcessingFailed(message.into())
    }

    pub fn download(message: impl Into<String>) -> Self {
        StampError::DownloadFailed(message.into())
    }

    /// Short machine-friendly label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StampError::FileTooLarge { .. } => "file_too_large",
            StampError::OutputTooLarge { .. } => "output_too_large",
            StampError::DownloadFailed(_) => "download_failed",
            StampError::ProcessingFailed(_) => "processing_failed",
            StampError::Transport(_) => "transport",
        }
    }

    /// The single reply shown to the user when a request fails.
    ///
    /// Only the size-related kinds get a specific text; `OutputTooLarge` is
    /// only ever raised on the video path.
    pub fn user_message(&self, media: MediaKind) -> String {
        match (self, media) {
            (StampError::FileTooLarge { limit, .. }, MediaKind::Photo) => format!(
                "❌ The image is too large. Please send an image smaller than {}MB.",
                megabytes(*limit)
            ),
            (StampError::FileTooLarge { limit, .. }, MediaKind::Video) => format!(
                "❌ The video is too large. Please send a video smaller than {}MB.",
                megabytes(*limit)
            ),
            (StampError::OutputTooLarge { .. }, MediaKind::Video) => {
                "❌ The processed video is too large to be sent. Try a shorter video.".to_string()
            }
            (_, MediaKind::Photo) => {
                "❌ Something went wrong while processing your image. Please try again."
                    .to_string()
            }
            (_, MediaKind::Video) => {
                "❌ Something went wrong while processing your video. Please try again."
                    .to_string()
            }
        }
    }
}

/// Ceiling in MiB, rounded up to one decimal so the text never understates it.
fn megabytes(bytes: u64) -> String {
    let tenths = bytes.saturating_mul(10).div_ceil(1024 * 1024);
    if tenths % 10 == 0 {
        format!("{}", tenths / 10)
    } else {
        format!("{}.{}", tenths / 10, tenths % 10)
    }
}
