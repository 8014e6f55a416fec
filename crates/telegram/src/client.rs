//! Bot API client.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::TelegramError;

const API_BASE: &str = "https://api.telegram.org";

/// Client for the Telegram Bot API.
///
/// Built per invocation with the bot token; requests carry a short
/// timeout and are attempted once.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramClient {
    /// Create a client with the given bot token.
    pub fn new(token: impl Into<String>) -> Result<Self, TelegramError> {
        Self::with_base_url(token, API_BASE)
    }

    /// Client against a custom base URL (used by tests).
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, TelegramError> {
        let token = token.into();
        if token.is_empty() {
            return Err(TelegramError::MissingToken);
        }
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            token,
            base_url: base_url.into(),
        })
    }

    /// Create a client from the `BOT_TOKEN` environment variable.
    pub fn from_env() -> Result<Self, TelegramError> {
        let token = std::env::var("BOT_TOKEN").map_err(|_| TelegramError::MissingToken)?;
        Self::new(token)
    }

    /// Send a Markdown-formatted message to a chat.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let payload = SendMessagePayload {
            chat_id,
            text,
            parse_mode: "Markdown",
        };

        let response = self.http.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            error!(chat_id, %status, "HTTP error sending message");
            return Err(TelegramError::Api(format!("sendMessage returned {status}")));
        }

        let body: ApiResponse = response.json().await?;
        if !body.ok {
            let description = body.description.unwrap_or_else(|| "unknown error".to_string());
            error!(chat_id, %description, "Telegram API error");
            return Err(TelegramError::Api(description));
        }

        info!(chat_id, chars = text.len(), "Message sent");
        Ok(())
    }
}
