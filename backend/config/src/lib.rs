//! `markbot-config`: runtime configuration for the watermark bot.
//!
//! Provides:
//! - Typed config schema (telegram, media, logging)
//! - YAML loading with file lookup
//! - `${ENV_VAR}` substitution and the `BOT_TOKEN` override
//! - Default value application
//! - Validation with errors and warnings
//! - Config redaction for safe logging

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod settings;
pub mod validation;

pub use schema::MarkbotConfig;
pub use settings::{LogSettings, MediaSettings, Settings};
pub use io::{config_file_path, load_config};
pub use env::{apply_env_overrides, process_env, resolve_env_vars_with, MissingEnvVarError};
pub use redact::redact;
pub use defaults::apply_all_defaults;
pub use validation::{validate, ValidationReport, ConfigValidationError};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Load, substitute env vars, apply overrides and defaults, validate, and resolve settings.
///
/// This is the one-shot entry point. Binaries that log should call
/// [`prepare_config`], start the logger, then [`settings_from_config`], so
/// validation warnings reach a subscriber.
pub async fn load_settings(path: &Path) -> Result<Settings> {
    load_settings_with(path, &process_env()).await
}

/// `load_settings` against an explicit environment (useful for testing).
pub async fn load_settings_with(path: &Path, env: &HashMap<String, String>) -> Result<Settings> {
    let config = prepare_config_with(path, env).await?;
    settings_from_config(&config)
}

/// Load the file, substitute env vars, apply overrides and defaults.
///
/// Does not validate and does not log.
pub async fn prepare_config(path: &Path) -> Result<MarkbotConfig> {
    prepare_config_with(path, &process_env()).await
}

pub async fn prepare_config_with(
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<MarkbotConfig> {
    let raw_config = load_config(path).await?;

    let value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;
    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;
    let config: MarkbotConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_env_overrides(config, env);
    Ok(apply_all_defaults(config))
}

/// Validate a prepared config, log warnings and a redacted snapshot, and
/// resolve the runtime settings.
pub fn settings_from_config(config: &MarkbotConfig) -> Result<Settings> {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if !report.is_valid() {
        let details: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration:\n  {}", details.join("\n  "));
    }

    if let Ok(snapshot) = serde_json::to_value(config) {
        tracing::debug!(config = %redact(&snapshot), "Effective configuration");
    }

    Settings::from_config(config)
}
