//! `markbot stamp`: watermark one local file with the configured asset.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use markbot_config::{prepare_config_with, process_env, MediaSettings};
use markbot_core::{MediaKind, WatermarkSize};
use media::{detect_media_kind, ImageWatermarker, VideoWatermarker, WatermarkApplier};
use tracing::info;

pub async fn run(
    config_path: &Path,
    input: &Path,
    output: &Path,
    size: WatermarkSize,
    force_video: bool,
) -> Result<()> {
    run_with(config_path, &process_env(), input, output, size, force_video).await
}

async fn run_with(
    config_path: &Path,
    env: &HashMap<String, String>,
    input: &Path,
    output: &Path,
    size: WatermarkSize,
    force_video: bool,
) -> Result<()> {
    logging::init_logger("info", None)?;

    // Same substitution and defaults as `run`, minus the token validation.
    let config = prepare_config_with(config_path, env).await?;
    let media = MediaSettings::from_config(&config);

    let kind = resolve_kind(input, force_video)?;
    info!(input = %input.display(), media = %kind, size = %size, "Stamping file");

    let applier: Box<dyn WatermarkApplier> = match kind {
        MediaKind::Photo => Box::new(ImageWatermarker::new(media.watermark_path)),
        MediaKind::Video => Box::new(
            VideoWatermarker::new(media.watermark_path)
                .with_binaries(media.ffmpeg_path, media.ffprobe_path),
        ),
    };
    applier.apply(input, output, size).await?;

    println!("✅ Wrote {}", output.display());
    Ok(())
}

fn resolve_kind(input: &Path, force_video: bool) -> Result<MediaKind> {
    if force_video {
        return Ok(MediaKind::Video);
    }
    detect_media_kind(input).with_context(|| {
        format!(
            "Cannot tell whether {} is a photo or a video; pass --video for videos",
            input.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_extension_unless_forced() {
        assert_eq!(resolve_kind(Path::new("a.PNG"), false).unwrap(), MediaKind::Photo);
        assert_eq!(resolve_kind(Path::new("a.mov"), false).unwrap(), MediaKind::Video);
        assert_eq!(resolve_kind(Path::new("a.jpg"), true).unwrap(), MediaKind::Video);
        assert!(resolve_kind(Path::new("notes.txt"), false).is_err());
    }

    #[tokio::test]
    async fn watermark_path_from_env_reference_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("assets");
        std::fs::create_dir(&assets).unwrap();
        image::RgbaImage::from_pixel(20, 10, image::Rgba([255, 0, 0, 255]))
            .save(assets.join("wm.png"))
            .unwrap();
        let input = dir.path().join("photo.png");
        image::RgbImage::from_pixel(200, 100, image::Rgb([0, 0, 255]))
            .save(&input)
            .unwrap();
        let output = dir.path().join("out.png");

        let config_path = dir.path().join("markbot.yaml");
        std::fs::write(&config_path, "media:\n  watermarkPath: ${STAMP_ASSET_DIR}/wm.png\n").unwrap();
        let env = HashMap::from([(
            "STAMP_ASSET_DIR".to_string(),
            assets.display().to_string(),
        )]);

        run_with(&config_path, &env, &input, &output, WatermarkSize::Large, false)
            .await
            .unwrap();

        let stamped = image::open(&output).unwrap().to_rgb8();
        assert_eq!(stamped.dimensions(), (200, 100));
        // Large preset: 100px wide overlay at (10, 10).
        assert!(stamped.get_pixel(50, 12)[0] > 150);
        assert_eq!(stamped.get_pixel(150, 80), &image::Rgb([0, 0, 255]));
    }
}
