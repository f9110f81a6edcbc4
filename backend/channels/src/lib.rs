//! Telegram side of markbot: transport, file fetching, commands, and the
//! per-message watermarking pipeline.

pub mod commands;
pub mod fetcher;
pub mod handlers;
pub mod messages;
pub mod telegram;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use commands::Command;
pub use fetcher::FileFetcher;
pub use handlers::BotHandlers;
pub use telegram::{TelegramAdapter, TelegramApi};
pub use transport::{ChatApi, SentMessage, TextFormat};
