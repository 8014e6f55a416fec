//! User CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::User;

/// Create a user on first interaction, or refresh the profile fields if
/// the user already exists. Last writer wins.
pub async fn upsert_user(
    pool: &SqlitePool,
    user_id: i64,
    display_name: &str,
    username: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (user_id, display_name, username, created_at, updated_at)
        VALUES (?, ?, ?, datetime('now'), datetime('now'))
        ON CONFLICT(user_id) DO UPDATE SET
            display_name = excluded.display_name,
            username = excluded.username,
            updated_at = datetime('now')
        "#,
    )
    .bind(user_id)
    .bind(display_name)
    .bind(username)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a user by id.
pub async fn get_user(pool: &SqlitePool, user_id: i64) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, display_name, username, timezone, created_at, updated_at
        FROM users
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: user_id.to_string(),
    })
}

/// Update a user's timezone.
pub async fn set_timezone(pool: &SqlitePool, user_id: i64, timezone: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET timezone = ?, updated_at = datetime('now')
        WHERE user_id = ?
        "#,
    )
    .bind(timezone)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: user_id.to_string(),
        });
    }

    Ok(())
}

/// List all users eligible for proactive notifications.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, display_name, username, timezone, created_at, updated_at
        FROM users
        ORDER BY user_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Count total users.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
