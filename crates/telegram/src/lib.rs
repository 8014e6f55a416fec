//! Telegram Bot API client and webhook types for Minder.
//!
//! The thin transport layer: [`TelegramClient`] sends outbound messages,
//! and [`Update`] / [`Message`] decode incoming webhook payloads. Command
//! parsing and replies live in the api crate; scheduling lives in the
//! scheduler crate.

mod client;
mod error;
mod types;

pub use client::TelegramClient;
pub use error::TelegramError;
pub use types::{Chat, Message, TelegramUser, Update};
