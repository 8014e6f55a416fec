//! Chat message audit log.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::MessageLogEntry;

/// Append a chat message to the audit log.
///
/// `sender` is "user" for inbound messages and "bot" for replies.
pub async fn append(
    pool: &SqlitePool,
    user_id: i64,
    sender: &str,
    message: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO message_log (user_id, sort_key, message, sender, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(format!("message_{}_{}", now.timestamp(), sender))
    .bind(message)
    .bind(sender)
    .bind(now.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Most recent messages for a user, newest first.
pub async fn recent(pool: &SqlitePool, user_id: i64, limit: i64) -> Result<Vec<MessageLogEntry>> {
    let entries = sqlx::query_as::<_, MessageLogEntry>(
        r#"
        SELECT user_id, sort_key, message, sender, created_at
        FROM message_log
        WHERE user_id = ?
        ORDER BY created_at DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}
