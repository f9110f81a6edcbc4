//! The platform calls the handlers make, behind a trait so the pipeline can
//! run against a fake in tests.

use std::path::Path;

use async_trait::async_trait;
use markbot_core::{RemoteFile, StampResult};

/// A message the bot sent and may later edit or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub message_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Html,
}

/// Outbound operations against the messaging platform.
///
/// Implementations map platform failures to `StampError::Transport`.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Resolve a file id to its byte size and remote path.
    async fn get_file(&self, file_id: &str) -> StampResult<RemoteFile>;

    async fn send_text(&self, chat_id: i64, text: &str, format: TextFormat) -> StampResult<SentMessage>;

    async fn edit_text(&self, message: SentMessage, text: &str) -> StampResult<()>;

    async fn delete_message(&self, message: SentMessage) -> StampResult<()>;

    /// Upload a local photo with an HTML caption.
    async fn send_photo(&self, chat_id: i64, path: &Path, caption: &str) -> StampResult<()>;

    /// Upload a local video with an HTML caption.
    async fn send_video(&self, chat_id: i64, path: &Path, caption: &str) -> StampResult<()>;
}
