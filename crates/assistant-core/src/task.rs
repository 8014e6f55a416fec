//! Task model and listing order.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Completion state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Incomplete,
    Complete,
}

impl TaskStatus {
    /// Storage tag for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::Complete => "complete",
        }
    }

    /// Parse a storage tag back into a status.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "incomplete" => Some(Self::Incomplete),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }
}

/// A user-owned to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Owning user (chat id).
    pub user_id: i64,
    /// UUID assigned at creation.
    pub task_id: String,
    pub name: String,
    /// Priority 1 (lowest) to 5 (highest); `None` when unset.
    pub priority: Option<u8>,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    /// Date the task was created.
    pub added_date: NaiveDate,
}

/// Listing order for any task listing: priority descending (unset sorts
/// below priority 1), then due date ascending (no due date last), then
/// added date ascending as the final tie-break.
pub fn listing_order(a: &Task, b: &Task) -> Ordering {
    // Unset priority maps to 0, below the valid [1, 5] range.
    b.priority
        .unwrap_or(0)
        .cmp(&a.priority.unwrap_or(0))
        .then_with(|| cmp_due_date(a.due_date, b.due_date))
        .then_with(|| a.added_date.cmp(&b.added_date))
}

fn cmp_due_date(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
