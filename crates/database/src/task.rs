//! Task store adapter: CRUD, name lookup, sorted listings.

use assistant_core::{listing_order, Task, TaskStatus};
use chrono::NaiveDate;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::{DatabaseError, Result};

/// Raw task row; converted into the domain [`Task`] after fetch.
#[derive(Debug, FromRow)]
struct TaskRow {
    user_id: i64,
    task_id: String,
    name: String,
    priority: Option<i64>,
    due_date: Option<NaiveDate>,
    status: String,
    added_date: NaiveDate,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            user_id: row.user_id,
            task_id: row.task_id,
            name: row.name,
            priority: row.priority.map(|p| p as u8),
            due_date: row.due_date,
            // The status column is CHECK-constrained to the two valid tags.
            status: TaskStatus::parse(&row.status).unwrap_or(TaskStatus::Incomplete),
            added_date: row.added_date,
        }
    }
}

const SELECT_TASK: &str = r#"
SELECT user_id, task_id, name, priority, due_date, status, added_date
FROM tasks
"#;

/// Create a new task with a fresh UUID. Returns the stored task.
pub async fn add_task(
    pool: &SqlitePool,
    user_id: i64,
    name: &str,
    priority: Option<u8>,
    due_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<Task> {
    let task = Task {
        user_id,
        task_id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        priority,
        due_date,
        status: TaskStatus::Incomplete,
        added_date: today,
    };

    sqlx::query(
        r#"
        INSERT INTO tasks (user_id, task_id, name, priority, due_date, status, added_date)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(task.user_id)
    .bind(&task.task_id)
    .bind(&task.name)
    .bind(task.priority.map(i64::from))
    .bind(task.due_date)
    .bind(task.status.as_str())
    .bind(task.added_date)
    .execute(pool)
    .await?;

    tracing::debug!(user_id, task_id = %task.task_id, "Task added");
    Ok(task)
}

/// Get a task by id.
pub async fn get_task(pool: &SqlitePool, user_id: i64, task_id: &str) -> Result<Task> {
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        "{SELECT_TASK} WHERE user_id = ? AND task_id = ?"
    ))
    .bind(user_id)
    .bind(task_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Task",
        id: task_id.to_string(),
    })?;

    Ok(row.into())
}

/// Look a task up by its human-entered name (case-insensitive exact
/// match).
///
/// Zero matches is `NotFound` and more than one is `Ambiguous`; the caller
/// never gets an arbitrary pick.
pub async fn find_by_name(pool: &SqlitePool, user_id: i64, name: &str) -> Result<Task> {
    let mut rows = sqlx::query_as::<_, TaskRow>(&format!(
        "{SELECT_TASK} WHERE user_id = ? AND name = ? COLLATE NOCASE"
    ))
    .bind(user_id)
    .bind(name)
    .fetch_all(pool)
    .await?;

    match rows.len() {
        0 => Err(DatabaseError::NotFound {
            entity: "Task",
            id: name.to_string(),
        }),
        1 => Ok(rows.remove(0).into()),
        count => Err(DatabaseError::Ambiguous {
            entity: "Task",
            name: name.to_string(),
            count,
        }),
    }
}

/// List all incomplete tasks for a user, in listing order.
pub async fn list_incomplete(pool: &SqlitePool, user_id: i64) -> Result<Vec<Task>> {
    let rows = sqlx::query_as::<_, TaskRow>(&format!(
        "{SELECT_TASK} WHERE user_id = ? AND status != 'complete'"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(sorted(rows))
}

/// List tasks due on `today` that are not complete, in listing order.
pub async fn list_due_today(
    pool: &SqlitePool,
    user_id: i64,
    today: NaiveDate,
) -> Result<Vec<Task>> {
    let rows = sqlx::query_as::<_, TaskRow>(&format!(
        "{SELECT_TASK} WHERE user_id = ? AND due_date = ? AND status != 'complete'"
    ))
    .bind(user_id)
    .bind(today)
    .fetch_all(pool)
    .await?;

    Ok(sorted(rows))
}

/// Overwrite a task's mutable fields. Last writer wins.
pub async fn update_task(pool: &SqlitePool, task: &Task) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE tasks
        SET name = ?, priority = ?, due_date = ?, status = ?
        WHERE user_id = ? AND task_id = ?
        "#,
    )
    .bind(&task.name)
    .bind(task.priority.map(i64::from))
    .bind(task.due_date)
    .bind(task.status.as_str())
    .bind(task.user_id)
    .bind(&task.task_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Task",
            id: task.task_id.clone(),
        });
    }

    Ok(())
}

/// Mark a task complete.
pub async fn complete_task(pool: &SqlitePool, user_id: i64, task_id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE tasks
        SET status = 'complete'
        WHERE user_id = ? AND task_id = ?
        "#,
    )
    .bind(user_id)
    .bind(task_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Task",
            id: task_id.to_string(),
        });
    }

    Ok(())
}

/// Delete a task.
pub async fn delete_task(pool: &SqlitePool, user_id: i64, task_id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM tasks
        WHERE user_id = ? AND task_id = ?
        "#,
    )
    .bind(user_id)
    .bind(task_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Task",
            id: task_id.to_string(),
        });
    }

    Ok(())
}

fn sorted(rows: Vec<TaskRow>) -> Vec<Task> {
    let mut tasks: Vec<Task> = rows.into_iter().map(Task::from).collect();
    tasks.sort_by(listing_order);
    tasks
}
