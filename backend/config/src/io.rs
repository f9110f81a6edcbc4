//! Config file lookup and loading.

use crate::schema::MarkbotConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Default config file name in the working directory.
pub const CONFIG_FILE_NAME: &str = "markbot.yaml";

/// Env var naming an explicit config file.
pub const CONFIG_PATH_VAR: &str = "MARKBOT_CONFIG";

/// Resolve which config file to read.
/// Priority: explicit path > `MARKBOT_CONFIG` > `./markbot.yaml` > `<config dir>/markbot/config.yaml`.
///
/// The returned path may not exist; `load_config` treats that as defaults.
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        let user = dir.join("markbot").join("config.yaml");
        if user.exists() {
            return user;
        }
    }
    local
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist. Nothing is
/// logged here: this runs before the logger is configured.
pub async fn load_config(path: &Path) -> Result<MarkbotConfig> {
    if !path.exists() {
        return Ok(MarkbotConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    // An empty file parses as YAML null, not as an empty mapping.
    if raw.trim().is_empty() {
        return Ok(MarkbotConfig::default());
    }

    let config: MarkbotConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    Ok(config)
}
