//! Video watermarking through `ffprobe` and `ffmpeg`.
//!
//! The overlay is always scaled to half the video width; the chat's size
//! preset is not applied on this path.

use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use markbot_core::{scaled_width, StampError, StampResult, WatermarkSize, WATERMARK_OFFSET};
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::WatermarkApplier;

/// Fixed watermark-to-video width ratio.
pub const VIDEO_SCALE_FACTOR: f64 = 0.5;

/// How much of ffmpeg's stderr to keep in an error.
const STDERR_TAIL_CHARS: usize = 800;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
}

/// Applies the watermark asset to videos by shelling out to ffmpeg.
#[derive(Debug, Clone)]
pub struct VideoWatermarker {
    watermark_path: PathBuf,
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl VideoWatermarker {
    pub fn new(watermark_path: impl Into<PathBuf>) -> Self {
        Self {
            watermark_path: watermark_path.into(),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }

    pub fn with_binaries(mut self, ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        self.ffmpeg_path = ffmpeg.into();
        self.ffprobe_path = ffprobe.into();
        self
    }

    /// Width in pixels of the first video stream.
    pub async fn probe_width(&self, input: &Path) -> StampResult<u32> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v",
                "-show_entries",
                "stream=codec_type,width,height",
                "-of",
                "json",
            ])
            .arg(input)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                StampError::processing(format!("Failed to spawn {}: {e}", self.ffprobe_path))
            })?;

        if !output.status.success() {
            return Err(StampError::processing(format!(
                "ffprobe failed ({}): {}",
                output.status,
                stderr_tail(&output)
            )));
        }

        parse_probe_width(&String::from_utf8_lossy(&output.stdout))
    }

    /// Run ffmpeg with the scale+overlay graph, writing `output`.
    pub async fn transcode(&self, input: &Path, output: &Path, filter: &str) -> StampResult<()> {
        let result = Command::new(&self.ffmpeg_path)
            .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(input)
            .arg("-i")
            .arg(&self.watermark_path)
            .args(["-filter_complex", filter, "-movflags", "+faststart"])
            .arg(output)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                StampError::processing(format!("Failed to spawn {}: {e}", self.ffmpeg_path))
            })?;

        if !result.status.success() {
            return Err(StampError::processing(format!(
                "ffmpeg failed ({}): {}",
                result.status,
                stderr_tail(&result)
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl WatermarkApplier for VideoWatermarker {
    #[instrument(skip(self), fields(watermark = %self.watermark_path.display()))]
    async fn apply(&self, input: &Path, output: &Path, size: WatermarkSize) -> StampResult<()> {
        debug!(requested = %size, factor = VIDEO_SCALE_FACTOR, "Video path uses a fixed scale factor");

        let width = self.probe_width(input).await?;
        let filter = build_filter_graph(width);
        debug!(width, filter = %filter, "Built overlay filter");

        self.transcode(input, output, &filter).await?;
        info!(width, "Watermarked video");
        Ok(())
    }
}

/// Pull the width of the first video stream out of `ffprobe -of json` output.
pub fn parse_probe_width(json: &str) -> StampResult<u32> {
    let probe: ProbeOutput = serde_json::from_str(json)
        .map_err(|e| StampError::processing(format!("Unreadable ffprobe output: {e}")))?;

    probe
        .streams
        .iter()
        .filter(|s| s.codec_type.as_deref().unwrap_or("video") == "video")
        .find_map(|s| s.width.filter(|w| *w > 0))
        .ok_or_else(|| StampError::processing("No video stream found"))
}

/// `[1:v]scale=<round(width × 0.5)>:-1[wm];[0:v][wm]overlay=10:10`
pub fn build_filter_graph(video_width: u32) -> String {
    let target = scaled_width(video_width, VIDEO_SCALE_FACTOR);
    let (x, y) = WATERMARK_OFFSET;
    format!("[1:v]scale={target}:-1[wm];[0:v][wm]overlay={x}:{y}")
}

fn stderr_tail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let count = stderr.chars().count();
    if count <= STDERR_TAIL_CHARS {
        stderr.to_string()
    } else {
        stderr.chars().skip(count - STDERR_TAIL_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_scales_to_half_width() {
        assert_eq!(
            build_filter_graph(1000),
            "[1:v]scale=500:-1[wm];[0:v][wm]overlay=10:10"
        );
        assert_eq!(build_filter_graph(1281), "[1:v]scale=641:-1[wm];[0:v][wm]overlay=10:10");
    }

    #[test]
    fn probe_picks_video_stream() {
        let json = r#"{"programs": [], "streams": [
            {"codec_type": "audio"},
            {"codec_type": "video", "width": 1920, "height": 1080}
        ]}"#;
        assert_eq!(parse_probe_width(json).unwrap(), 1920);
    }

    #[test]
    fn probe_without_video_stream_fails() {
        let json = r#"{"streams": [{"codec_type": "audio"}]}"#;
        let err = parse_probe_width(json).unwrap_err();
        assert!(err.to_string().contains("No video stream"));

        let err = parse_probe_width(r#"{}"#).unwrap_err();
        assert!(matches!(err, StampError::ProcessingFailed(_)));
    }

    #[test]
    fn probe_garbage_fails() {
        assert!(parse_probe_width("not json").is_err());
    }

    #[tokio::test]
    async fn missing_ffprobe_is_processing_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"\0\0\0\x18ftypmp42").unwrap();

        let applier = VideoWatermarker::new(dir.path().join("watermark.png"))
            .with_binaries("/nonexistent/ffmpeg", "/nonexistent/ffprobe");
        let err = applier
            .apply(&input, &dir.path().join("out.mp4"), WatermarkSize::Small)
            .await
            .unwrap_err();
        assert!(matches!(err, StampError::ProcessingFailed(_)));
        assert!(err.to_string().contains("/nonexistent/ffprobe"));
    }
}
