//! Notification log operations.
//!
//! Every proactive send attempt is recorded here, one row per attempt.
//! The log doubles as the signal the scheduler consults to suppress
//! duplicate sends within the same period.

use assistant_core::MessageKind;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::NotificationLogEntry;

/// Append a notification log entry for a send attempt.
///
/// The sort key is `notification_{unix_ts}_{type}`; a second attempt in
/// the same second replaces the first, matching put-item semantics.
pub async fn log_notification(
    pool: &SqlitePool,
    user_id: i64,
    kind: MessageKind,
    message: &str,
    events_count: i64,
    delivered: bool,
    now: DateTime<Utc>,
) -> Result<NotificationLogEntry> {
    let entry = NotificationLogEntry {
        user_id,
        sort_key: format!("notification_{}_{}", now.timestamp(), kind.log_type()),
        notification_type: kind.log_type().to_string(),
        message: message.to_string(),
        events_count,
        sent_at: now.to_rfc3339(),
        status: if delivered { "sent" } else { "failed" }.to_string(),
    };

    sqlx::query(
        r#"
        INSERT OR REPLACE INTO notification_log
            (user_id, sort_key, type, message, events_count, sent_at, status)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.user_id)
    .bind(&entry.sort_key)
    .bind(&entry.notification_type)
    .bind(&entry.message)
    .bind(entry.events_count)
    .bind(&entry.sent_at)
    .bind(&entry.status)
    .execute(pool)
    .await?;

    tracing::debug!(user_id, sort_key = %entry.sort_key, status = %entry.status, "Notification logged");
    Ok(entry)
}

/// Timestamp of the most recent successfully sent notification of the
/// given kind, if any. Failed attempts are ignored so they never suppress
/// a retry on the next trigger.
pub async fn last_sent(
    pool: &SqlitePool,
    user_id: i64,
    kind: MessageKind,
) -> Result<Option<DateTime<Utc>>> {
    let sent_at = sqlx::query_scalar::<_, String>(
        r#"
        SELECT sent_at
        FROM notification_log
        WHERE user_id = ? AND type = ? AND status = 'sent'
        ORDER BY sent_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(kind.log_type())
    .fetch_optional(pool)
    .await?;

    Ok(sent_at
        .and_then(|ts| DateTime::parse_from_rfc3339(&ts).ok())
        .map(|ts| ts.with_timezone(&Utc)))
}

/// List a user's notification history, newest first.
pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<NotificationLogEntry>> {
    let entries = sqlx::query_as::<_, NotificationLogEntry>(
        r#"
        SELECT user_id, sort_key, type, message, events_count, sent_at, status
        FROM notification_log
        WHERE user_id = ?
        ORDER BY sent_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}
