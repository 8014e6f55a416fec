//! Multi-calendar merge.

use assistant_core::CalendarEvent;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::provider::{CalendarListEntry, CalendarProvider};

/// Fetch and concatenate events from every accessible calendar within the
/// window.
///
/// Calendars are queried independently in listing order; a failure on one
/// calendar is logged and skipped so partial results still flow. If the
/// calendar list itself cannot be fetched, only the primary calendar is
/// queried. The merged list is not globally sorted; ordering is the
/// selector's and composer's concern.
pub async fn fetch_merged<P: CalendarProvider>(
    provider: &P,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<CalendarEvent> {
    let calendars: Vec<CalendarListEntry> = match provider.list_calendars().await {
        Ok(list) => list
            .into_iter()
            .filter(|calendar| calendar.access_role.is_readable())
            .collect(),
        Err(error) => {
            warn!(%error, "Failed to fetch calendar list, falling back to primary");
            vec![CalendarListEntry::primary_fallback()]
        }
    };

    let mut merged = Vec::new();
    for calendar in &calendars {
        match provider
            .list_events(&calendar.id, window_start, window_end)
            .await
        {
            Ok(events) => {
                debug!(calendar = %calendar.id, count = events.len(), "Merged calendar events");
                merged.extend(events);
            }
            Err(error) => {
                warn!(calendar = %calendar.id, %error, "Failed to fetch events from calendar, skipping");
            }
        }
    }

    debug!(total = merged.len(), calendars = calendars.len(), "Calendar merge complete");
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalendarError;
    use crate::provider::AccessRole;
    use assistant_core::{EventStatus, EventTime};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;

    struct MockProvider {
        calendars: Result<Vec<CalendarListEntry>, ()>,
        events: HashMap<String, Result<Vec<CalendarEvent>, ()>>,
    }

    #[async_trait]
    impl CalendarProvider for MockProvider {
        async fn list_calendars(&self) -> Result<Vec<CalendarListEntry>, CalendarError> {
            self.calendars
                .clone()
                .map_err(|_| CalendarError::Provider("list failed".to_string()))
        }

        async fn list_events(
            &self,
            calendar_id: &str,
            _time_min: DateTime<Utc>,
            _time_max: DateTime<Utc>,
        ) -> Result<Vec<CalendarEvent>, CalendarError> {
            match self.events.get(calendar_id) {
                Some(Ok(events)) => Ok(events.clone()),
                Some(Err(())) => Err(CalendarError::Provider(format!(
                    "{calendar_id} unreachable"
                ))),
                None => Ok(Vec::new()),
            }
        }
    }

    fn entry(id: &str, role: AccessRole) -> CalendarListEntry {
        CalendarListEntry {
            id: id.to_string(),
            summary: id.to_string(),
            access_role: role,
            primary: id == "primary",
        }
    }

    fn event(id: &str, calendar_id: &str) -> CalendarEvent {
        CalendarEvent {
            event_id: id.to_string(),
            calendar_id: calendar_id.to_string(),
            title: id.to_string(),
            description: String::new(),
            location: String::new(),
            start: Some(EventTime::Timed(
                Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
            )),
            end: Some(EventTime::Timed(
                Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap(),
            )),
            status: EventStatus::Confirmed,
        }
    }

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 2, 23, 59, 59).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_merges_in_listing_order() {
        let provider = MockProvider {
            calendars: Ok(vec![
                entry("work", AccessRole::Owner),
                entry("personal", AccessRole::Reader),
            ]),
            events: HashMap::from([
                ("work".to_string(), Ok(vec![event("w1", "work")])),
                ("personal".to_string(), Ok(vec![event("p1", "personal")])),
            ]),
        };

        let (start, end) = window();
        let merged = fetch_merged(&provider, start, end).await;
        let ids: Vec<&str> = merged.iter().map(|e| e.event_id.as_str()).collect();
        assert_eq!(ids, vec!["w1", "p1"]);
    }

    #[tokio::test]
    async fn test_excludes_unreadable_calendars() {
        let provider = MockProvider {
            calendars: Ok(vec![
                entry("work", AccessRole::Owner),
                entry("busy-only", AccessRole::Other),
            ]),
            events: HashMap::from([
                ("work".to_string(), Ok(vec![event("w1", "work")])),
                ("busy-only".to_string(), Ok(vec![event("x1", "busy-only")])),
            ]),
        };

        let (start, end) = window();
        let merged = fetch_merged(&provider, start, end).await;
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].event_id, "w1");
    }

    #[tokio::test]
    async fn test_one_failing_calendar_is_skipped() {
        let provider = MockProvider {
            calendars: Ok(vec![
                entry("broken", AccessRole::Owner),
                entry("work", AccessRole::Owner),
            ]),
            events: HashMap::from([
                ("broken".to_string(), Err(())),
                ("work".to_string(), Ok(vec![event("w1", "work")])),
            ]),
        };

        let (start, end) = window();
        let merged = fetch_merged(&provider, start, end).await;
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].event_id, "w1");
    }

    #[tokio::test]
    async fn test_calendar_list_failure_falls_back_to_primary() {
        let provider = MockProvider {
            calendars: Err(()),
            events: HashMap::from([(
                "primary".to_string(),
                Ok(vec![event("p1", "primary")]),
            )]),
        };

        let (start, end) = window();
        let merged = fetch_merged(&provider, start, end).await;
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].event_id, "p1");
    }
}
