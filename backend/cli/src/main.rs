mod doctor_cmd;
mod stamp_cmd;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use markbot_channels::{BotHandlers, FileFetcher, TelegramAdapter, TelegramApi};
use markbot_config::defaults::DEFAULT_LOG_LEVEL;
use markbot_config::{
    config_file_path, prepare_config, settings_from_config, LogSettings, Settings,
};
use markbot_core::{InMemoryPreferenceStore, WatermarkSize};
use media::{ImageWatermarker, VideoWatermarker};

#[derive(Parser)]
#[command(name = "markbot")]
#[command(about = "markbot: Telegram bot that watermarks photos and videos")]
#[command(version)]
struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Start the bot (default)
    Run,
    /// Check configuration, the watermark asset, and the ffmpeg binaries
    Doctor,
    /// Watermark a local file without Telegram
    Stamp {
        input: PathBuf,
        output: PathBuf,
        /// Watermark size preset: small, medium or large
        #[arg(short, long, default_value_t = WatermarkSize::Large)]
        size: WatermarkSize,
        /// Treat the input as a video regardless of its extension
        #[arg(long)]
        video: bool,
    },
}

#[tokio::main]
async fn main() {
    // A missing .env is fine; real env vars still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config_path = config_file_path(cli.config.as_deref());

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_bot(config_path).await,
        Commands::Doctor => doctor_cmd::run(&config_path).await,
        Commands::Stamp {
            input,
            output,
            size,
            video,
        } => stamp_cmd::run(&config_path, &input, &output, size, video).await,
    };

    if let Err(e) = result {
        // Config failures happen before `run` configures logging.
        let _ = logging::init_logger(DEFAULT_LOG_LEVEL, None);
        error!(error = %format!("{e:#}"), "Fatal error");
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }
}

async fn run_bot(config_path: PathBuf) -> Result<()> {
    let config = prepare_config(&config_path).await?;
    let log = LogSettings::from_config(&config);
    logging::init_logger(&log.level, log.dir.as_deref())?;

    if config_path.exists() {
        info!(path = %config_path.display(), "Loaded config");
    } else {
        info!(path = %config_path.display(), "Config file does not exist; using defaults");
    }
    let settings = settings_from_config(&config)?;

    info!(
        config = %config_path.display(),
        watermark = %settings.watermark_path.display(),
        downloads = %settings.downloads_dir.display(),
        "Starting markbot"
    );

    prepare_filesystem(&settings).await?;

    let api = TelegramApi::new(&settings.bot_token, &settings.api_url)?;
    let fetcher = FileFetcher::new(
        &settings.api_url,
        &settings.bot_token,
        settings.limits,
        settings.download_timeout,
    );
    let image = Arc::new(ImageWatermarker::new(settings.watermark_path.clone()));
    let video = Arc::new(
        VideoWatermarker::new(settings.watermark_path.clone())
            .with_binaries(settings.ffmpeg_path.clone(), settings.ffprobe_path.clone()),
    );

    let handlers = Arc::new(BotHandlers::new(
        Arc::new(api.clone()),
        Arc::new(InMemoryPreferenceStore::new()),
        fetcher,
        image,
        video,
        settings.downloads_dir.clone(),
    ));

    TelegramAdapter::new(&api, handlers).start().await
}

/// The watermark must exist before any update is accepted; the downloads
/// directory is created on demand.
async fn prepare_filesystem(settings: &Settings) -> Result<()> {
    if !settings.watermark_path.is_file() {
        bail!(
            "Watermark image not found at {}",
            settings.watermark_path.display()
        );
    }
    tokio::fs::create_dir_all(&settings.downloads_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create downloads directory {}",
                settings.downloads_dir.display()
            )
        })?;
    Ok(())
}
