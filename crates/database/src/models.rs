//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user of the bot, identified by their Telegram chat id.
///
/// Created (or refreshed) on first interaction; never hard-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Telegram user/chat id.
    pub user_id: i64,
    /// Display name used in greetings.
    pub display_name: String,
    /// Telegram username, if the account has one.
    pub username: Option<String>,
    /// IANA timezone name (informational; scheduling runs in UTC).
    pub timezone: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last profile refresh timestamp.
    pub updated_at: String,
}

/// One proactive notification attempt, written once per send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct NotificationLogEntry {
    /// Owning user.
    pub user_id: i64,
    /// Composite key: `notification_{unix_ts}_{type}`.
    pub sort_key: String,
    /// Notification type tag ("morning_summary" or "current_event_reminder").
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub notification_type: String,
    /// The message body that was (or would have been) delivered.
    pub message: String,
    /// Number of calendar events reflected in the message.
    pub events_count: i64,
    /// Send attempt timestamp (RFC 3339).
    pub sent_at: String,
    /// "sent" or "failed".
    pub status: String,
}

/// One chat message, kept as an audit trail of bot traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MessageLogEntry {
    /// Owning user.
    pub user_id: i64,
    /// Composite key: `message_{unix_ts}_{sender}`.
    pub sort_key: String,
    /// Message text.
    pub message: String,
    /// "user" or "bot".
    pub sender: String,
    /// Timestamp (RFC 3339).
    pub created_at: String,
}
