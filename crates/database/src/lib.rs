//! SQLite persistence layer for Minder.
//!
//! This crate provides async database operations for users, tasks, the
//! notification log, and the chat message log using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{user, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:minder.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Register a user on first interaction
//!     user::upsert_user(db.pool(), 1681943565, "Dana", Some("dana")).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod message_log;
pub mod models;
pub mod notification;
pub mod task;
pub mod user;

pub use error::{DatabaseError, Result};
pub use models::{MessageLogEntry, NotificationLogEntry, User};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// High enough for concurrent per-user notification processing.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::{MessageKind, TaskStatus};
    use chrono::{NaiveDate, TimeZone, Utc};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_user_upsert_and_list() {
        let db = test_db().await;

        user::upsert_user(db.pool(), 100, "Alice", None).await.unwrap();
        let fetched = user::get_user(db.pool(), 100).await.unwrap();
        assert_eq!(fetched.display_name, "Alice");
        assert_eq!(fetched.timezone, "UTC");

        // Refresh updates the profile in place.
        user::upsert_user(db.pool(), 100, "Alice B", Some("aliceb")).await.unwrap();
        let fetched = user::get_user(db.pool(), 100).await.unwrap();
        assert_eq!(fetched.display_name, "Alice B");
        assert_eq!(fetched.username.as_deref(), Some("aliceb"));

        assert_eq!(user::list_users(db.pool()).await.unwrap().len(), 1);
        assert_eq!(user::count_users(db.pool()).await.unwrap(), 1);

        let missing = user::get_user(db.pool(), 999).await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_task_crud() {
        let db = test_db().await;
        let today = date(2025, 6, 2);

        let task = task::add_task(db.pool(), 100, "Buy milk", Some(3), None, today)
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Incomplete);

        let fetched = task::get_task(db.pool(), 100, &task.task_id).await.unwrap();
        assert_eq!(fetched, task);

        let mut edited = fetched.clone();
        edited.priority = Some(5);
        edited.due_date = Some(date(2025, 6, 3));
        task::update_task(db.pool(), &edited).await.unwrap();
        let fetched = task::get_task(db.pool(), 100, &task.task_id).await.unwrap();
        assert_eq!(fetched.priority, Some(5));

        task::complete_task(db.pool(), 100, &task.task_id).await.unwrap();
        assert!(task::list_incomplete(db.pool(), 100).await.unwrap().is_empty());

        task::delete_task(db.pool(), 100, &task.task_id).await.unwrap();
        let missing = task::get_task(db.pool(), 100, &task.task_id).await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_incomplete_ordering() {
        let db = test_db().await;
        let today = date(2025, 6, 2);

        // Priority 5 due tomorrow must precede priority 3 due today.
        task::add_task(db.pool(), 100, "A", Some(3), Some(today), today)
            .await
            .unwrap();
        task::add_task(db.pool(), 100, "B", Some(5), Some(date(2025, 6, 3)), today)
            .await
            .unwrap();
        task::add_task(db.pool(), 100, "C", None, None, today).await.unwrap();

        let names: Vec<String> = task::list_incomplete(db.pool(), 100)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[tokio::test]
    async fn test_list_due_today_filters() {
        let db = test_db().await;
        let today = date(2025, 6, 2);

        task::add_task(db.pool(), 100, "due", Some(2), Some(today), today)
            .await
            .unwrap();
        task::add_task(db.pool(), 100, "later", Some(4), Some(date(2025, 6, 9)), today)
            .await
            .unwrap();
        let done = task::add_task(db.pool(), 100, "done", Some(5), Some(today), today)
            .await
            .unwrap();
        task::complete_task(db.pool(), 100, &done.task_id).await.unwrap();

        let due = task::list_due_today(db.pool(), 100, today).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].name, "due");
    }

    #[tokio::test]
    async fn test_find_by_name_exactly_one() {
        let db = test_db().await;
        let today = date(2025, 6, 2);

        task::add_task(db.pool(), 100, "Standup", None, None, today)
            .await
            .unwrap();

        // Case-insensitive exact match.
        let found = task::find_by_name(db.pool(), 100, "standup").await.unwrap();
        assert_eq!(found.name, "Standup");

        let missing = task::find_by_name(db.pool(), 100, "retro").await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_find_by_name_ambiguous() {
        let db = test_db().await;
        let today = date(2025, 6, 2);

        task::add_task(db.pool(), 100, "Standup", None, None, today)
            .await
            .unwrap();
        task::add_task(db.pool(), 100, "standup", Some(2), None, today)
            .await
            .unwrap();

        let result = task::find_by_name(db.pool(), 100, "standup").await;
        assert!(matches!(
            result,
            Err(DatabaseError::Ambiguous { count: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_tasks_scoped_per_user() {
        let db = test_db().await;
        let today = date(2025, 6, 2);

        task::add_task(db.pool(), 100, "mine", None, None, today).await.unwrap();
        task::add_task(db.pool(), 200, "theirs", None, None, today).await.unwrap();

        let mine = task::list_incomplete(db.pool(), 100).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "mine");
    }

    #[tokio::test]
    async fn test_notification_log_and_last_sent() {
        let db = test_db().await;
        let first = Utc.with_ymd_and_hms(2025, 6, 2, 7, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();

        notification::log_notification(
            db.pool(), 100, MessageKind::MorningSummary, "summary", 3, true, first,
        )
        .await
        .unwrap();
        notification::log_notification(
            db.pool(), 100, MessageKind::CurrentStatus, "status", 1, false, second,
        )
        .await
        .unwrap();

        // Failed attempts never count as sent.
        let last = notification::last_sent(db.pool(), 100, MessageKind::CurrentStatus)
            .await
            .unwrap();
        assert!(last.is_none());

        let last = notification::last_sent(db.pool(), 100, MessageKind::MorningSummary)
            .await
            .unwrap();
        assert_eq!(last, Some(first));

        let entries = notification::list_for_user(db.pool(), 100).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, "failed");
        assert_eq!(entries[1].notification_type, "morning_summary");
    }

    #[tokio::test]
    async fn test_message_log_round_trip() {
        let db = test_db().await;
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();

        message_log::append(db.pool(), 100, "user", "/tasks", now).await.unwrap();
        message_log::append(db.pool(), 100, "bot", "No tasks yet", now).await.unwrap();

        let entries = message_log::recent(db.pool(), 100, 10).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.sender == "user"));
    }
}
