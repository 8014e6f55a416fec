//! Time-window predicates and query windows.
//!
//! All arithmetic is in UTC. Events with missing or unparseable times fail
//! the predicates quietly so a single bad record never aborts a batch.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::event::CalendarEvent;

/// True iff the event is timed, has both endpoints, and contains `now`
/// (inclusive on both ends). All-day events are never active.
pub fn is_active(event: &CalendarEvent, now: DateTime<Utc>) -> bool {
    match (event.timed_start(), event.timed_end()) {
        (Some(start), Some(end)) => start <= now && now <= end,
        _ => false,
    }
}

/// True iff the event is timed and starts strictly after `now`.
pub fn is_upcoming(event: &CalendarEvent, now: DateTime<Utc>) -> bool {
    matches!(event.timed_start(), Some(start) if start > now)
}

/// Time remaining until a timed event starts.
///
/// `None` unless the event is upcoming, so negative durations never reach
/// formatting code.
pub fn time_until(event: &CalendarEvent, now: DateTime<Utc>) -> Option<Duration> {
    let start = event.timed_start()?;
    if start > now {
        Some(start - now)
    } else {
        None
    }
}

/// Query window for current-status checks: one hour before `now` through
/// the end of the day. Catches events that started earlier and are still
/// running, plus everything remaining today.
pub fn current_status_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (now - Duration::hours(1), end_of_day(now))
}

/// Query window for "today's schedule": local midnight through
/// 23:59:59.999 of the same day.
pub fn today_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (start_of_day(now), end_of_day(now))
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(now) + Duration::days(1) - Duration::milliseconds(1)
}
