pub mod error;
pub mod preferences;
pub mod request;
pub mod types;

pub use error::{StampError, StampResult};
pub use preferences::{InMemoryPreferenceStore, PreferenceStore};
pub use request::RequestPaths;
pub use types::{
    scaled_width, MediaKind, RemoteFile, SizeLimits, UnknownSizeError, WatermarkSize,
    DEFAULT_PHOTO_MAX_BYTES, DEFAULT_VIDEO_MAX_BYTES, WATERMARK_OFFSET, WATERMARK_OPACITY,
};
