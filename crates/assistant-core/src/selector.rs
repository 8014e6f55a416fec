//! Active/next event selection over a merged event list.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::event::CalendarEvent;
use crate::timewindow::{is_active, is_upcoming};

/// Result of scanning the merged event list at a single instant.
///
/// Both fields are independently optional: there may be an active event
/// with nothing after it, a quiet moment before the next event, or an
/// empty day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    /// The timed event whose interval contains `now`, if any.
    pub active: Option<CalendarEvent>,
    /// The nearest timed event starting strictly after `now`, if any.
    pub next: Option<CalendarEvent>,
}

/// Pick the currently-active event and the next upcoming event.
///
/// Single pass over the merged list. All-day entries and events with
/// missing times are skipped. The first active event encountered wins;
/// among upcoming events the minimum start wins, with first-seen input
/// order breaking exact ties (no cross-calendar priority is defined).
/// Apart from that tie-break, the result does not depend on input order.
pub fn select(events: &[CalendarEvent], now: DateTime<Utc>) -> Selection {
    let mut selection = Selection::default();
    let mut next_start: Option<DateTime<Utc>> = None;

    for event in events {
        if event.is_all_day() {
            continue;
        }

        if selection.active.is_none() && is_active(event, now) {
            selection.active = Some(event.clone());
        }

        if is_upcoming(event, now) {
            // is_upcoming guarantees a timed start.
            let start = match event.timed_start() {
                Some(start) => start,
                None => continue,
            };
            if next_start.map_or(true, |best| start < best) {
                next_start = Some(start);
                selection.next = Some(event.clone());
            }
        }
    }

    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventStatus, EventTime};
    use chrono::{NaiveDate, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    fn event(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent {
            event_id: id.to_string(),
            calendar_id: "primary".to_string(),
            title: format!("Event {id}"),
            description: String::new(),
            location: String::new(),
            start: Some(EventTime::Timed(start)),
            end: Some(EventTime::Timed(end)),
            status: EventStatus::Confirmed,
        }
    }

    #[test]
    fn test_select_active_and_next() {
        let events = vec![
            event("a", at(9, 0), at(10, 0)),
            event("b", at(11, 0), at(12, 0)),
            event("c", at(14, 0), at(15, 0)),
        ];
        let selection = select(&events, at(9, 30));

        assert_eq!(selection.active.as_ref().unwrap().event_id, "a");
        assert_eq!(selection.next.as_ref().unwrap().event_id, "b");
    }

    #[test]
    fn test_select_both_absent() {
        let selection = select(&[], at(9, 0));
        assert!(selection.active.is_none());
        assert!(selection.next.is_none());
    }

    #[test]
    fn test_select_order_independent_for_distinct_starts() {
        let a = event("a", at(11, 0), at(12, 0));
        let b = event("b", at(14, 0), at(15, 0));
        let now = at(9, 0);

        let forward = select(&[a.clone(), b.clone()], now);
        let reversed = select(&[b, a], now);

        assert_eq!(forward.next.as_ref().unwrap().event_id, "a");
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_select_deterministic() {
        let events = vec![
            event("a", at(11, 0), at(12, 0)),
            event("b", at(14, 0), at(15, 0)),
        ];
        let now = at(10, 0);
        assert_eq!(select(&events, now), select(&events, now));
    }

    #[test]
    fn test_select_tie_break_first_seen_wins() {
        let events = vec![
            event("work", at(11, 0), at(12, 0)),
            event("personal", at(11, 0), at(11, 30)),
        ];
        let selection = select(&events, at(10, 0));
        assert_eq!(selection.next.as_ref().unwrap().event_id, "work");
    }

    #[test]
    fn test_select_skips_all_day() {
        let mut all_day = event("allday", at(0, 0), at(23, 0));
        all_day.start = Some(EventTime::AllDay(
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        ));
        all_day.end = Some(EventTime::AllDay(
            NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
        ));
        let timed = event("timed", at(11, 0), at(12, 0));

        let selection = select(&[all_day, timed], at(11, 30));
        assert_eq!(selection.active.as_ref().unwrap().event_id, "timed");
        assert!(selection.next.is_none());
    }

    #[test]
    fn test_select_skips_malformed() {
        let mut broken = event("broken", at(9, 0), at(10, 0));
        broken.end = None;
        let ok = event("ok", at(9, 0), at(10, 0));

        let selection = select(&[broken, ok], at(9, 30));
        assert_eq!(selection.active.as_ref().unwrap().event_id, "ok");
    }

    #[test]
    fn test_select_first_active_wins() {
        let events = vec![
            event("first", at(9, 0), at(11, 0)),
            event("second", at(9, 30), at(10, 30)),
        ];
        let selection = select(&events, at(10, 0));
        assert_eq!(selection.active.as_ref().unwrap().event_id, "first");
    }
}
