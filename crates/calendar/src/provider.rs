//! Calendar provider interface.

use assistant_core::CalendarEvent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::CalendarError;

/// Access role on a calendar. Only owner/writer/reader calendars are
/// queried; anything else is excluded from aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessRole {
    Owner,
    Writer,
    Reader,
    #[serde(other)]
    Other,
}

impl AccessRole {
    /// Whether events may be read from a calendar with this role.
    pub fn is_readable(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// A calendar visible to the account.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarListEntry {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(rename = "accessRole")]
    pub access_role: AccessRole,
    #[serde(default)]
    pub primary: bool,
}

impl CalendarListEntry {
    /// Fallback entry used when the calendar list itself cannot be
    /// fetched: query only the primary calendar.
    pub fn primary_fallback() -> Self {
        Self {
            id: "primary".to_string(),
            summary: "primary".to_string(),
            access_role: AccessRole::Owner,
            primary: true,
        }
    }
}

/// Read access to the user's calendars.
///
/// Implementations are constructed per invocation with fresh credentials.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// List calendars visible to the account.
    async fn list_calendars(&self) -> Result<Vec<CalendarListEntry>, CalendarError>;

    /// List events from one calendar within a time window. Events with
    /// missing or unparseable times are returned with `None` endpoints,
    /// not dropped.
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;
}
