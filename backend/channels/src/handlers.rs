//! Per-message request handling: commands, help text, and the watermarking
//! pipeline for photos and videos.

use std::path::PathBuf;
use std::sync::Arc;

use logging::{RequestEvent, RequestEventLogger};
use markbot_core::{
    MediaKind, PreferenceStore, RemoteFile, RequestPaths, StampError, StampResult, WatermarkSize,
};
use media::{WatermarkApplier, cleanup_files};
use tracing::{debug, error, info, warn};

use crate::commands::Command;
use crate::fetcher::FileFetcher;
use crate::messages;
use crate::transport::{ChatApi, SentMessage, TextFormat};

pub struct BotHandlers {
    api: Arc<dyn ChatApi>,
    preferences: Arc<dyn PreferenceStore>,
    fetcher: FileFetcher,
    image: Arc<dyn WatermarkApplier>,
    video: Arc<dyn WatermarkApplier>,
    downloads_dir: PathBuf,
}

impl BotHandlers {
    pub fn new(
        api: Arc<dyn ChatApi>,
        preferences: Arc<dyn PreferenceStore>,
        fetcher: FileFetcher,
        image: Arc<dyn WatermarkApplier>,
        video: Arc<dyn WatermarkApplier>,
        downloads_dir: PathBuf,
    ) -> Self {
        Self {
            api,
            preferences,
            fetcher,
            image,
            video,
            downloads_dir,
        }
    }

    pub async fn handle_command(&self, chat_id: i64, command: Command) -> StampResult<()> {
        match command {
            Command::Start => {
                self.api
                    .send_text(chat_id, messages::GREETING_HTML, TextFormat::Html)
                    .await?;
            }
            Command::Size(arg) => match arg.trim().parse::<WatermarkSize>() {
                Ok(size) => {
                    self.preferences.set(chat_id, size).await;
                    info!(chat_id, size = %size, "Watermark size updated");
                    self.api
                        .send_text(chat_id, &messages::size_set(size), TextFormat::Plain)
                        .await?;
                }
                Err(e) => {
                    debug!(chat_id, error = %e, "Rejected /size argument");
                    self.api
                        .send_text(chat_id, messages::SIZE_USAGE, TextFormat::Plain)
                        .await?;
                }
            },
        }
        Ok(())
    }

    /// Plain text gets the help reply; unrecognised `/commands` are ignored.
    pub async fn handle_text(&self, chat_id: i64, text: &str) -> StampResult<()> {
        if text.trim_start().starts_with('/') {
            debug!(chat_id, "Ignoring unknown command");
            return Ok(());
        }
        self.api
            .send_text(chat_id, messages::HELP_HTML, TextFormat::Html)
            .await?;
        Ok(())
    }

    pub async fn handle_photo(&self, chat_id: i64, file_id: &str) {
        self.handle_media(chat_id, file_id, MediaKind::Photo).await
    }

    pub async fn handle_video(&self, chat_id: i64, file_id: &str) {
        self.handle_media(chat_id, file_id, MediaKind::Video).await
    }

    /// Run one request end to end. Errors become a single reply to the chat
    /// and the temp files are removed on every path.
    async fn handle_media(&self, chat_id: i64, file_id: &str, kind: MediaKind) {
        let paths = RequestPaths::new(&self.downloads_dir, file_id, kind);
        let mut status: Option<SentMessage> = None;

        let result = self
            .process(chat_id, file_id, kind, &paths, &mut status)
            .await;

        if let Err(err) = result {
            error!(chat_id, file_id, media = %kind, error = %err, "Watermark request failed");
            RequestEventLogger::log_event(
                chat_id,
                file_id,
                RequestEvent::Failed {
                    kind: err.kind().to_string(),
                    error_msg: err.to_string(),
                },
            );
            self.report_failure(chat_id, kind, &err, status.take()).await;
        }

        cleanup_files(&paths.all()).await;
    }

    async fn process(
        &self,
        chat_id: i64,
        file_id: &str,
        kind: MediaKind,
        paths: &RequestPaths,
        status: &mut Option<SentMessage>,
    ) -> StampResult<()> {
        let size = self.preferences.get(chat_id).await;
        RequestEventLogger::log_event(
            chat_id,
            file_id,
            RequestEvent::Received {
                media: kind.to_string(),
                size_preset: size.to_string(),
            },
        );

        let remote: RemoteFile = self.fetcher.resolve(self.api.as_ref(), file_id, kind).await?;

        *status = Some(
            self.api
                .send_text(chat_id, messages::downloading(kind), TextFormat::Plain)
                .await?,
        );

        let (input, bytes) = self.fetcher.download(&remote, &paths.input).await?;
        RequestEventLogger::log_event(chat_id, file_id, RequestEvent::Downloaded { bytes });

        if let Some(message) = *status {
            self.api.edit_text(message, messages::PROCESSING).await?;
        }

        let applier = match kind {
            MediaKind::Photo => &self.image,
            MediaKind::Video => &self.video,
        };
        applier.apply(&input, &paths.output, size).await?;

        let output_bytes = tokio::fs::metadata(&paths.output)
            .await
            .map_err(|e| StampError::processing(format!("output missing: {e}")))?
            .len();
        if kind == MediaKind::Video {
            let limit = self.fetcher.limits().video_max_bytes;
            if output_bytes > limit {
                return Err(StampError::OutputTooLarge {
                    size: output_bytes,
                    limit,
                });
            }
        }
        RequestEventLogger::log_event(chat_id, file_id, RequestEvent::Processed { output_bytes });

        if let Some(message) = status.take() {
            self.api.delete_message(message).await?;
        }

        let caption = messages::caption(kind);
        match kind {
            MediaKind::Photo => self.api.send_photo(chat_id, &paths.output, caption).await?,
            MediaKind::Video => self.api.send_video(chat_id, &paths.output, caption).await?,
        }
        RequestEventLogger::log_event(chat_id, file_id, RequestEvent::Delivered);
        Ok(())
    }

    async fn report_failure(
        &self,
        chat_id: i64,
        kind: MediaKind,
        err: &StampError,
        status: Option<SentMessage>,
    ) {
        if let Some(message) = status {
            if let Err(e) = self.api.delete_message(message).await {
                warn!(chat_id, error = %e, "Failed to delete status message");
            }
        }
        if let Err(e) = self
            .api
            .send_text(chat_id, &err.user_message(kind), TextFormat::Plain)
            .await
        {
            warn!(chat_id, error = %e, "Failed to send error reply");
        }
    }
}
