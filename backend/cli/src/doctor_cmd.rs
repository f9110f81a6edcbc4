//! CLI Doctor Command
//!
//! Checks everything `markbot run` needs before it starts polling.

use std::path::Path;

use anyhow::{bail, Result};
use markbot_config::{prepare_config, settings_from_config, validate, Settings};
use media::{detect_mime_type, is_image};
use tokio::process::Command;

/// Executes the full doctor diagnosis.
pub async fn run(config_path: &Path) -> Result<()> {
    println!("\n🔍 Running markbot doctor...\n");
    println!("Config file: {}", config_path.display());

    let settings = match prepare_config(config_path)
        .await
        .and_then(|config| {
            for warning in validate(&config).warnings {
                println!("  🟡 {}: {}", warning.path, warning.message);
            }
            settings_from_config(&config)
        }) {
        Ok(settings) => {
            println!("  🟢 Configuration is valid");
            settings
        }
        Err(e) => {
            println!("  🔴 Configuration: {e:#}");
            bail!("Some checks failed! Please fix the errors above.");
        }
    };

    let mut is_ok = check_watermark(&settings);
    is_ok &= check_downloads_dir(&settings).await;
    is_ok &= check_binary("ffmpeg", &settings.ffmpeg_path).await;
    is_ok &= check_binary("ffprobe", &settings.ffprobe_path).await;

    println!();
    if is_ok {
        println!("✅ All checks passed! markbot is ready.");
        Ok(())
    } else {
        bail!("Some checks failed! Please fix the errors above.")
    }
}

fn check_watermark(settings: &Settings) -> bool {
    println!("Checking watermark asset:");
    let path = &settings.watermark_path;
    if !path.is_file() {
        println!("  🔴 {} does not exist (REQUIRED)", path.display());
        return false;
    }
    if !is_image(detect_mime_type(path)) {
        println!("  🟡 {} does not look like an image", path.display());
    } else {
        println!("  🟢 {}", path.display());
    }
    true
}

async fn check_downloads_dir(settings: &Settings) -> bool {
    println!("Checking downloads directory:");
    let dir = &settings.downloads_dir;
    match tokio::fs::create_dir_all(dir).await {
        Ok(()) => {
            println!("  🟢 {} is usable", dir.display());
            true
        }
        Err(e) => {
            println!("  🔴 {} cannot be created: {e}", dir.display());
            false
        }
    }
}

/// Runs `<binary> -version`. Only the video path needs these, so a failure
/// is reported but photos would still work.
async fn check_binary(name: &str, binary: &str) -> bool {
    println!("Checking {name}:");
    match Command::new(binary).arg("-version").output().await {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout);
            let first = version.lines().next().unwrap_or_default();
            println!("  🟢 {first}");
            true
        }
        Ok(out) => {
            println!("  🔴 `{binary} -version` exited with {}", out.status);
            false
        }
        Err(e) => {
            println!("  🔴 `{binary}` could not be started: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_fails_check() {
        assert!(!check_binary("ffmpeg", "/nonexistent/markbot-ffmpeg").await);
    }

    #[tokio::test]
    async fn invalid_config_fails_doctor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markbot.yaml");
        std::fs::write(&path, "telegram:\n  botToken: \"\"\n").unwrap();
        assert!(run(&path).await.is_err());
    }
}
