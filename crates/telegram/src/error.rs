//! Error types for the Telegram client.

use thiserror::Error;

/// Errors that can occur talking to the Telegram Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Bot token is not configured.
    #[error("bot token not configured")]
    MissingToken,

    /// HTTP transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Bot API rejected the request.
    #[error("telegram api error: {0}")]
    Api(String),
}
