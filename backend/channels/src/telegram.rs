use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use logging::redact_sensitive_data;
use markbot_core::{RemoteFile, StampError, StampResult};
use teloxide::payloads::setters::*;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ParseMode, PhotoSize};
use tracing::{debug, error, info};

use crate::commands::Command;
use crate::handlers::BotHandlers;
use crate::transport::{ChatApi, SentMessage, TextFormat};

fn transport_error(e: teloxide::RequestError) -> StampError {
    StampError::Transport(redact_sensitive_data(&e.to_string()))
}

/// `ChatApi` over the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramApi {
    bot: Bot,
}

impl TelegramApi {
    /// `api_url` replaces the default Bot API root, e.g. for a local Bot API server.
    pub fn new(token: &str, api_url: &str) -> anyhow::Result<Self> {
        let url: reqwest::Url = api_url.parse()?;
        Ok(Self {
            bot: Bot::new(token).set_api_url(url),
        })
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl ChatApi for TelegramApi {
    async fn get_file(&self, file_id: &str) -> StampResult<RemoteFile> {
        let file = self
            .bot
            .get_file(file_id)
            .await
            .map_err(transport_error)?;
        Ok(RemoteFile {
            size: u64::from(file.meta.size),
            path: file.path,
        })
    }

    async fn send_text(&self, chat_id: i64, text: &str, format: TextFormat) -> StampResult<SentMessage> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);
        if format == TextFormat::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        let sent = request.await.map_err(transport_error)?;
        Ok(SentMessage {
            chat_id,
            message_id: sent.id.0,
        })
    }

    async fn edit_text(&self, message: SentMessage, text: &str) -> StampResult<()> {
        self.bot
            .edit_message_text(ChatId(message.chat_id), MessageId(message.message_id), text)
            .await
            .map_err(transport_error)?;
        Ok(())
    }

    async fn delete_message(&self, message: SentMessage) -> StampResult<()> {
        self.bot
            .delete_message(ChatId(message.chat_id), MessageId(message.message_id))
            .await
            .map_err(transport_error)?;
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, path: &Path, caption: &str) -> StampResult<()> {
        self.bot
            .send_photo(ChatId(chat_id), InputFile::file(path))
            .caption(caption)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(transport_error)?;
        Ok(())
    }

    async fn send_video(&self, chat_id: i64, path: &Path, caption: &str) -> StampResult<()> {
        self.bot
            .send_video(ChatId(chat_id), InputFile::file(path))
            .caption(caption)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(transport_error)?;
        Ok(())
    }
}

/// Long-polls Telegram and routes each message to [`BotHandlers`].
pub struct TelegramAdapter {
    bot: Bot,
    handlers: Arc<BotHandlers>,
}

impl TelegramAdapter {
    pub fn new(api: &TelegramApi, handlers: Arc<BotHandlers>) -> Self {
        Self {
            bot: api.bot().clone(),
            handlers,
        }
    }

    /// Runs until Ctrl-C. Messages of one chat are handled in order.
    pub async fn start(&self) -> anyhow::Result<()> {
        info!("Starting Telegram adapter");

        let handler = Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(on_command),
            )
            .branch(dptree::endpoint(on_message));

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![self.handlers.clone()])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Telegram adapter stopped");
        Ok(())
    }
}

async fn on_command(handlers: Arc<BotHandlers>, msg: Message, cmd: Command) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    debug!(chat_id, command = ?cmd, "Received command");
    if let Err(e) = handlers.handle_command(chat_id, cmd).await {
        error!(chat_id, error = %e, "Failed to answer command");
    }
    respond(())
}

async fn on_message(handlers: Arc<BotHandlers>, msg: Message) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;

    match incoming(&msg) {
        Some(Incoming::Photo(file_id)) => handlers.handle_photo(chat_id, file_id).await,
        Some(Incoming::Video(file_id)) => handlers.handle_video(chat_id, file_id).await,
        Some(Incoming::Text(text)) => {
            if let Err(e) = handlers.handle_text(chat_id, text).await {
                error!(chat_id, error = %e, "Failed to answer text message");
            }
        }
        None => {}
    }
    respond(())
}

/// What a non-command message asks the bot to do.
#[derive(Debug, PartialEq, Eq)]
enum Incoming<'a> {
    Photo(&'a str),
    Video(&'a str),
    Text(&'a str),
}

/// Photos win over videos, which win over text; anything else is ignored.
fn incoming(msg: &Message) -> Option<Incoming<'_>> {
    if let Some(photos) = msg.photo() {
        return pick_largest(photos).map(|p| Incoming::Photo(p.file.id.as_str()));
    }
    if let Some(video) = msg.video() {
        return Some(Incoming::Video(video.file.id.as_str()));
    }
    msg.text().map(Incoming::Text)
}

/// The rendition with the most pixels.
fn pick_largest(photos: &[PhotoSize]) -> Option<&PhotoSize> {
    photos
        .iter()
        .max_by_key(|p| u64::from(p.width) * u64::from(p.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(json: serde_json::Value) -> Message {
        serde_json::from_value(json).unwrap()
    }

    fn base(extra: serde_json::Value) -> serde_json::Value {
        let mut msg = serde_json::json!({
            "message_id": 7,
            "date": 1_700_000_000,
            "chat": { "id": 42, "type": "private", "first_name": "Ada" },
            "from": { "id": 42, "is_bot": false, "first_name": "Ada" },
        });
        msg.as_object_mut()
            .unwrap()
            .extend(extra.as_object().unwrap().clone());
        msg
    }

    fn photo_size(id: &str, width: u32, height: u32) -> serde_json::Value {
        serde_json::json!({
            "file_id": id,
            "file_unique_id": format!("u{id}"),
            "width": width,
            "height": height,
            "file_size": 1000,
        })
    }

    #[test]
    fn largest_photo_is_by_area_not_position() {
        let msg = message(base(serde_json::json!({
            "photo": [
                photo_size("small", 90, 90),
                photo_size("big", 1280, 720),
                photo_size("medium", 320, 320),
            ]
        })));
        assert_eq!(incoming(&msg), Some(Incoming::Photo("big")));
    }

    #[test]
    fn empty_photo_list_is_ignored() {
        assert!(pick_largest(&[]).is_none());
    }

    #[test]
    fn video_and_text_are_routed() {
        let video = message(base(serde_json::json!({
            "video": {
                "file_id": "vid",
                "file_unique_id": "uvid",
                "width": 640,
                "height": 360,
                "duration": 3,
            }
        })));
        assert_eq!(incoming(&video), Some(Incoming::Video("vid")));

        let text = message(base(serde_json::json!({ "text": "hello" })));
        assert_eq!(incoming(&text), Some(Incoming::Text("hello")));
    }

    #[test]
    fn photo_caption_does_not_turn_into_text() {
        let msg = message(base(serde_json::json!({
            "photo": [photo_size("only", 100, 100)],
            "caption": "look"
        })));
        assert_eq!(incoming(&msg), Some(Incoming::Photo("only")));
    }

    #[test]
    fn other_messages_are_ignored() {
        let msg = message(base(serde_json::json!({
            "location": { "latitude": 52.52, "longitude": 13.405 }
        })));
        assert_eq!(incoming(&msg), None);
    }
}
