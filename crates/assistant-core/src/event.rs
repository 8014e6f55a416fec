//! Calendar event model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Start or end of a calendar event.
///
/// Timed events carry a full UTC instant; all-day events carry only a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    /// A concrete instant.
    Timed(DateTime<Utc>),
    /// A date without a time of day.
    AllDay(NaiveDate),
}

/// Confirmation status as reported by the calendar provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Confirmed,
    Tentative,
    Cancelled,
}

/// A calendar event merged from one of the user's calendars.
///
/// Events are fetched live from the provider per invocation and are not
/// authoritative state. Missing or unparseable times decode to `None` at
/// the provider boundary; such events are skipped by active/next selection
/// but still render (degraded) in the daily schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub event_id: String,
    pub calendar_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub status: EventStatus,
}

impl CalendarEvent {
    /// Whether this is an all-day event (date only, no time of day).
    pub fn is_all_day(&self) -> bool {
        matches!(self.start, Some(EventTime::AllDay(_)))
    }

    /// The start instant, if the event is timed.
    pub fn timed_start(&self) -> Option<DateTime<Utc>> {
        match self.start {
            Some(EventTime::Timed(t)) => Some(t),
            _ => None,
        }
    }

    /// The end instant, if the event is timed.
    pub fn timed_end(&self) -> Option<DateTime<Utc>> {
        match self.end {
            Some(EventTime::Timed(t)) => Some(t),
            _ => None,
        }
    }

    /// Sort key for "today's schedule" ordering.
    ///
    /// All-day events sort by their bare date string and timed events by
    /// their RFC 3339 timestamp, so all-day entries interleave lexically
    /// ahead of the same day's timed events. Events without a start sort
    /// first.
    pub fn start_sort_key(&self) -> String {
        match self.start {
            Some(EventTime::Timed(t)) => t.to_rfc3339(),
            Some(EventTime::AllDay(d)) => d.to_string(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn timed(ts: &str) -> Option<EventTime> {
        Some(EventTime::Timed(
            DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc),
        ))
    }

    fn event(start: Option<EventTime>, end: Option<EventTime>) -> CalendarEvent {
        CalendarEvent {
            event_id: "e1".to_string(),
            calendar_id: "primary".to_string(),
            title: "Standup".to_string(),
            description: String::new(),
            location: String::new(),
            start,
            end,
            status: EventStatus::Confirmed,
        }
    }

    #[test]
    fn test_all_day_detection() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let all_day = event(Some(EventTime::AllDay(date)), Some(EventTime::AllDay(date)));
        assert!(all_day.is_all_day());
        assert!(all_day.timed_start().is_none());

        let timed_event = event(timed("2025-06-01T09:00:00Z"), timed("2025-06-01T10:00:00Z"));
        assert!(!timed_event.is_all_day());
        assert!(timed_event.timed_start().is_some());
    }

    #[test]
    fn test_missing_times() {
        let bare = event(None, None);
        assert!(!bare.is_all_day());
        assert!(bare.timed_start().is_none());
        assert!(bare.timed_end().is_none());
        assert_eq!(bare.start_sort_key(), "");
    }

    #[test]
    fn test_start_sort_key_interleaves_all_day_first() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let all_day = event(Some(EventTime::AllDay(date)), None);
        let timed_event = event(timed("2025-06-01T00:00:00Z"), None);

        // "2025-06-01" < "2025-06-01T00:00:00+00:00" lexically.
        assert!(all_day.start_sort_key() < timed_event.start_sort_key());
    }

    #[test]
    fn test_start_sort_key_orders_timed_events() {
        let early = event(timed("2025-06-01T09:00:00Z"), None);
        let late = event(timed("2025-06-01T13:30:00Z"), None);
        assert!(early.start_sort_key() < late.start_sort_key());
    }

    #[test]
    fn test_timed_start_utc_normalization() {
        let offset = event(timed("2025-06-01T09:00:00+02:00"), None);
        let expected = Utc.with_ymd_and_hms(2025, 6, 1, 7, 0, 0).unwrap();
        assert_eq!(offset.timed_start(), Some(expected));
    }
}
