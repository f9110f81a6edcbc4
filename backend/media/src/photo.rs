//! Raster image watermarking.
//!
//! Scales the watermark to a fraction of the source width, lowers its
//! opacity, and composites it with a source-over blend.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader};
use markbot_core::{
    StampError, StampResult, WatermarkSize, WATERMARK_OFFSET, WATERMARK_OPACITY,
};
use tokio::task;
use tracing::{debug, info, instrument};

use crate::WatermarkApplier;

/// Applies the watermark asset to still images.
#[derive(Debug, Clone)]
pub struct ImageWatermarker {
    watermark_path: PathBuf,
    opacity: f32,
    offset: (u32, u32),
}

impl ImageWatermarker {
    pub fn new(watermark_path: impl Into<PathBuf>) -> Self {
        Self {
            watermark_path: watermark_path.into(),
            opacity: WATERMARK_OPACITY,
            offset: WATERMARK_OFFSET,
        }
    }
}

#[async_trait]
impl WatermarkApplier for ImageWatermarker {
    #[instrument(skip(self), fields(watermark = %self.watermark_path.display()))]
    async fn apply(&self, input: &Path, output: &Path, size: WatermarkSize) -> StampResult<()> {
        let input = input.to_path_buf();
        let output = output.to_path_buf();
        let this = self.clone();

        task::spawn_blocking(move || this.apply_blocking(&input, &output, size))
            .await
            .map_err(|e| StampError::processing(format!("Task join error: {e}")))?
    }
}

impl ImageWatermarker {
    fn apply_blocking(&self, input: &Path, output: &Path, size: WatermarkSize) -> StampResult<()> {
        let reader = ImageReader::open(input)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| {
                StampError::processing(format!("Failed to open image {}: {e}", input.display()))
            })?;
        let format = reader.format().ok_or_else(|| {
            StampError::processing(format!("Unrecognized image format: {}", input.display()))
        })?;
        let base = reader.decode().map_err(|e| {
            StampError::processing(format!("Failed to decode image {}: {e}", input.display()))
        })?;

        // Loaded on every request; the asset is small and never cached.
        let mark = image::open(&self.watermark_path).map_err(|e| {
            StampError::processing(format!(
                "Failed to load watermark {}: {e}",
                self.watermark_path.display()
            ))
        })?;

        let result = composite(&base, &mark, size, self.opacity, self.offset);

        result.save_with_format(output, format).map_err(|e| {
            StampError::processing(format!(
                "Failed to write watermarked image {}: {e}",
                output.display()
            ))
        })?;

        info!(
            width = base.width(),
            height = base.height(),
            size = %size,
            format = ?format,
            "Watermarked image"
        );
        Ok(())
    }
}

/// Watermark dimensions for a source of `source_width`, preserving the mark's aspect ratio.
pub fn watermark_dimensions(
    source_width: u32,
    mark_width: u32,
    mark_height: u32,
    size: WatermarkSize,
) -> (u32, u32) {
    let width = size.watermark_width(source_width);
    let height = if mark_width == 0 {
        1
    } else {
        ((f64::from(mark_height) * f64::from(width) / f64::from(mark_width)).round() as u32).max(1)
    };
    (width, height)
}

/// Composite `mark` onto `base` at `offset`, scaled per `size`, at `opacity`.
///
/// The result keeps the base's alpha-ness so JPEG sources can be re-encoded as JPEG.
pub fn composite(
    base: &DynamicImage,
    mark: &DynamicImage,
    size: WatermarkSize,
    opacity: f32,
    offset: (u32, u32),
) -> DynamicImage {
    let (width, height) = watermark_dimensions(base.width(), mark.width(), mark.height(), size);
    debug!(
        from = ?(mark.width(), mark.height()),
        to = ?(width, height),
        "Scaling watermark"
    );

    let mut layer = mark.resize_exact(width, height, FilterType::Triangle).to_rgba8();
    let opacity = opacity.clamp(0.0, 1.0);
    for pixel in layer.pixels_mut() {
        pixel[3] = (f32::from(pixel[3]) * opacity).round() as u8;
    }

    let mut canvas = base.to_rgba8();
    imageops::overlay(&mut canvas, &layer, i64::from(offset.0), i64::from(offset.1));

    let canvas = DynamicImage::ImageRgba8(canvas);
    if base.color().has_alpha() {
        canvas
    } else {
        DynamicImage::ImageRgb8(canvas.to_rgb8())
    }
}
