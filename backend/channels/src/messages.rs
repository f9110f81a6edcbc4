//! User-facing texts.

use markbot_core::{MediaKind, WatermarkSize};

pub const HELP_HTML: &str = "Send a photo or video to add the watermark. \
Use /size <b>large</b>, <b>medium</b> or <b>small</b> to adjust its size.";

pub const GREETING_HTML: &str = "👋 Hi! I add a watermark to your photos and videos.\n\n\
Send a photo or video to add the watermark. \
Use /size <b>large</b>, <b>medium</b> or <b>small</b> to adjust its size.";

pub const SIZE_USAGE: &str = "Usage: /size small, /size medium or /size large";

pub const PROCESSING: &str = "⚙️ Adding watermark...";

pub fn downloading(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Photo => "⏳ Downloading image...",
        MediaKind::Video => "⏳ Downloading video...",
    }
}

pub fn caption(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Photo => "Here is your photo with the watermark! \
Use /size <b>large</b>, <b>medium</b> or <b>small</b> to adjust its size.",
        MediaKind::Video => "Here is your video with the watermark! \
Use /size <b>large</b>, <b>medium</b> or <b>small</b> to adjust its size.",
    }
}

pub fn size_set(size: WatermarkSize) -> String {
    format!("Watermark size set to {size}. Send a photo or video to apply it.")
}
