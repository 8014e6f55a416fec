//! Error types for scheduler operations.

use calendar::CalendarError;
use minder_database::DatabaseError;
use thiserror::Error;

/// Errors that can occur while running the notification engine.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Database failure that prevents or interrupts the run.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Credential or calendar failure.
    #[error("calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// Message delivery failed.
    #[error("delivery failed: {0}")]
    Delivery(String),
}
