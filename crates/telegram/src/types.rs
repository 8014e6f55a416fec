//! Webhook wire types.
//!
//! Only the fields the bot consumes are decoded; the rest of the update
//! payload is dropped at this boundary.

use serde::Deserialize;

/// One webhook update from the Bot API.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

/// An incoming chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    /// Unix timestamp of the message.
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub from: Option<TelegramUser>,
    pub chat: Chat,
}

/// The sending account.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// The chat a message arrived in.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub chat_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_update() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 123,
                "message": {
                    "message_id": 456,
                    "date": 1640995200,
                    "text": "/start",
                    "from": {"id": 12345, "first_name": "Test", "username": "testuser"},
                    "chat": {"id": 12345, "type": "private"}
                }
            }"#,
        )
        .unwrap();

        let message = update.message.unwrap();
        assert_eq!(message.text.as_deref(), Some("/start"));
        assert_eq!(message.chat.id, 12345);
        assert_eq!(message.from.unwrap().first_name, "Test");
    }

    #[test]
    fn test_parse_update_without_message() {
        let update: Update = serde_json::from_str(r#"{"update_id": 7}"#).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn test_parse_non_text_message() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 8,
                "message": {
                    "message_id": 9,
                    "date": 1640995200,
                    "chat": {"id": 1, "type": "private"}
                }
            }"#,
        )
        .unwrap();
        assert!(update.message.unwrap().text.is_none());
    }
}
