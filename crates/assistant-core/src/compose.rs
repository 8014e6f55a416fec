//! Notification message rendering.
//!
//! Pure functions from (selection, tasks, user) to the message body; no
//! I/O, no clocks read. Every rendered time is a 12-hour clock string; a
//! missing or unparseable time degrades to "Time TBD" instead of failing
//! the whole message.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{CalendarEvent, EventTime};
use crate::selector::Selection;
use crate::task::Task;
use crate::timewindow::time_until;

/// Which proactive message a trigger produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    MorningSummary,
    CurrentStatus,
}

impl MessageKind {
    /// Notification-log type tag for this kind.
    pub fn log_type(&self) -> &'static str {
        match self {
            Self::MorningSummary => "morning_summary",
            Self::CurrentStatus => "current_event_reminder",
        }
    }
}

/// Maximum open tasks listed before collapsing into a "+N more" suffix.
pub const TASK_DISPLAY_CAP: usize = 5;

/// Render the current-status reminder.
///
/// Active event (with an "ends in" countdown), then the next event (with a
/// "starts in" countdown), then always a task-reminder block. Absent
/// pieces fall back to "free" variants rather than disappearing.
pub fn compose_current_status(
    selection: &Selection,
    tasks: &[Task],
    user_name: &str,
    now: DateTime<Utc>,
) -> String {
    let mut message = format!("👋 Hello {user_name}!\n\n");

    match (&selection.active, &selection.next) {
        (Some(active), next) => {
            message.push_str("📅 **Current Event**\n\n");
            push_event_block(&mut message, active);
            if let Some(end) = active.timed_end() {
                if end >= now {
                    message.push_str(&format!("⏳ ends in {}\n", format_countdown(end - now)));
                }
            }
            if let Some(next) = next {
                message.push('\n');
                push_next_block(&mut message, next, now);
            }
        }
        (None, Some(next)) => {
            message.push_str("📅 **Current Status**\nYou're free right now.\n\n");
            push_next_block(&mut message, next, now);
        }
        (None, None) => {
            message.push_str("📅 **Current Status**\nNo events scheduled for right now.\n");
        }
    }

    message.push('\n');
    push_task_reminders(&mut message, tasks);

    message.push('\n');
    if selection.active.is_some() {
        message.push_str("Stay focused and productive! 💪");
    } else {
        message.push_str("You're free to work on other tasks! 🚀");
    }
    message
}

/// Render the morning summary: all of today's events, then the due-today
/// block, then the open-tasks block.
pub fn compose_morning_summary(
    events: &[CalendarEvent],
    due_today: &[Task],
    incomplete: &[Task],
    user_name: &str,
) -> String {
    let mut message = format!("🌅 Good morning {user_name}!\n\n📅 **Your Schedule Today**\n\n");

    if events.is_empty() {
        message.push_str("No events scheduled for today.\n\n");
    } else {
        let mut sorted: Vec<&CalendarEvent> = events.iter().collect();
        // All-day dates interleave lexically with RFC 3339 timestamps, so
        // all-day entries lead the day. See CalendarEvent::start_sort_key.
        sorted.sort_by_cached_key(|event| event.start_sort_key());

        for (i, event) in sorted.iter().enumerate() {
            let time_icon = match event.start {
                Some(EventTime::AllDay(_)) => "📅",
                Some(EventTime::Timed(_)) => "🕐",
                None => "❓",
            };
            message.push_str(&format!("{}. **{}**\n", i + 1, event.title));
            message.push_str(&format!(
                "   {} {} - {}\n",
                time_icon,
                format_clock(event.start),
                format_clock(event.end)
            ));
            if !event.location.is_empty() {
                message.push_str(&format!("   📍 {}\n", event.location));
            }
            message.push('\n');
        }

        let plural = if events.len() == 1 { "" } else { "s" };
        message.push_str(&format!("Total: {} event{} today\n\n", events.len(), plural));
    }

    message.push_str("📌 **Due Today**\n");
    if due_today.is_empty() {
        message.push_str("Nothing due today.\n");
    } else {
        for task in due_today {
            message.push_str(&format!("• {}\n", task_line(task)));
        }
    }

    message.push_str("\n🗒 **Open Tasks**\n");
    if incomplete.is_empty() {
        message.push_str("All tasks complete! 🎉\n");
    } else {
        for task in incomplete.iter().take(TASK_DISPLAY_CAP) {
            message.push_str(&format!("• {}\n", task_line(task)));
        }
        if incomplete.len() > TASK_DISPLAY_CAP {
            message.push_str(&format!("+{} more\n", incomplete.len() - TASK_DISPLAY_CAP));
        }
    }

    message.push_str("\nHave a great day! 💪");
    message
}

/// Format a countdown, floored to whole minutes. Hours are omitted when
/// zero: "2h 15m", "45m".
pub fn format_countdown(duration: Duration) -> String {
    let total_minutes = duration.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// 12-hour clock string for an event endpoint, degrading to "All Day" for
/// date-only events and "Time TBD" when the time is missing.
pub fn format_clock(time: Option<EventTime>) -> String {
    match time {
        Some(EventTime::Timed(t)) => t.format("%I:%M %p").to_string(),
        Some(EventTime::AllDay(_)) => "All Day".to_string(),
        None => "Time TBD".to_string(),
    }
}

/// Human date string for an event endpoint ("Monday, June 02").
fn format_date(time: Option<EventTime>) -> String {
    match time {
        Some(EventTime::Timed(t)) => t.format("%A, %B %d").to_string(),
        Some(EventTime::AllDay(d)) => d.format("%A, %B %d").to_string(),
        None => "Date TBD".to_string(),
    }
}

fn push_event_block(message: &mut String, event: &CalendarEvent) {
    message.push_str(&format!("**{}**\n", event.title));
    message.push_str(&format!(
        "🕐 {} - {} on {}\n",
        format_clock(event.start),
        format_clock(event.end),
        format_date(event.start)
    ));
    if !event.location.is_empty() {
        message.push_str(&format!("📍 {}\n", event.location));
    }
}

fn push_next_block(message: &mut String, next: &CalendarEvent, now: DateTime<Utc>) {
    message.push_str("⏭️ **Up Next**\n");
    message.push_str(&format!("**{}**\n", next.title));
    match time_until(next, now) {
        Some(until) => {
            message.push_str(&format!(
                "🕐 {} (starts in {})\n",
                format_clock(next.start),
                format_countdown(until)
            ));
        }
        None => {
            message.push_str(&format!("🕐 {}\n", format_clock(next.start)));
        }
    }
    if !next.location.is_empty() {
        message.push_str(&format!("📍 {}\n", next.location));
    }
}

fn push_task_reminders(message: &mut String, tasks: &[Task]) {
    message.push_str("🗒 **Task Reminders**\n");
    if tasks.is_empty() {
        message.push_str("No outstanding tasks. ✅\n");
        return;
    }
    for task in tasks.iter().take(TASK_DISPLAY_CAP) {
        message.push_str(&format!("• {}\n", task_line(task)));
    }
    if tasks.len() > TASK_DISPLAY_CAP {
        message.push_str(&format!("+{} more\n", tasks.len() - TASK_DISPLAY_CAP));
    }
}

fn task_line(task: &Task) -> String {
    let mut extras = Vec::new();
    if let Some(priority) = task.priority {
        extras.push(format!("p{priority}"));
    }
    if let Some(due) = task.due_date {
        extras.push(format!("due {due}"));
    }
    if extras.is_empty() {
        task.name.clone()
    } else {
        format!("{} ({})", task.name, extras.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventStatus;
    use crate::selector::select;
    use crate::task::TaskStatus;
    use chrono::{NaiveDate, NaiveTime, TimeZone};

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

    fn task(name: &str, priority: Option<u8>, due: Option<NaiveDate>) -> Task {
        Task {
            user_id: 1,
            task_id: format!("id-{name}"),
            name: name.to_string(),
            priority,
            due_date: due,
            status: TaskStatus::Incomplete,
            added_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        }
    }

    #[test]
    fn test_active_event_ends_in_countdown() {
        // Scenario: event T..T+60min, now = T+30min.
        let events = vec![event("a", at(9, 0), at(10, 0))];
        let selection = select(&events, at(9, 30));

        let text = compose_current_status(&selection, &[], "Dana", at(9, 30));
        assert!(text.contains("Current Event"));
        assert!(text.contains("ends in 30m"));
        assert!(!text.contains("Up Next"));
    }

    #[test]
    fn test_free_branch_always_has_task_block() {
        // Scenario: no events at all, empty task list.
        let text = compose_current_status(&Selection::default(), &[], "Dana", at(9, 0));
        assert!(text.contains("No events scheduled for right now."));
        assert!(text.contains("Task Reminders"));
        assert!(text.contains("No outstanding tasks."));
    }

    #[test]
    fn test_free_with_next_event_countdown() {
        let events = vec![event("later", at(11, 15), at(12, 0))];
        let selection = select(&events, at(9, 0));

        let text = compose_current_status(&selection, &[], "Dana", at(9, 0));
        assert!(text.contains("You're free right now."));
        assert!(text.contains("starts in 2h 15m"));
    }

    #[test]
    fn test_next_countdown_omits_zero_hours() {
        let events = vec![event("soon", at(9, 45), at(10, 0))];
        let selection = select(&events, at(9, 0));

        let text = compose_current_status(&selection, &[], "Dana", at(9, 0));
        assert!(text.contains("starts in 45m"));
        assert!(!text.contains("0h"));
    }

    #[test]
    fn test_morning_summary_empty_branches() {
        // Scenario: zero events and zero tasks still render full branches.
        let text = compose_morning_summary(&[], &[], &[], "Dana");
        assert!(text.contains("No events scheduled for today."));
        assert!(text.contains("Nothing due today."));
        assert!(text.contains("All tasks complete!"));
    }

    #[test]
    fn test_morning_summary_sorts_all_day_first() {
        let all_day = CalendarEvent {
            title: "Company holiday".to_string(),
            start: Some(EventTime::AllDay(
                NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            )),
            end: Some(EventTime::AllDay(
                NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            )),
            ..event("allday", at(0, 0), at(0, 0))
        };
        let timed = CalendarEvent {
            title: "Standup".to_string(),
            ..event("timed", at(0, 30), at(1, 0))
        };

        let text = compose_morning_summary(&[timed, all_day], &[], &[], "Dana");
        let holiday_pos = text.find("Company holiday").unwrap();
        let standup_pos = text.find("Standup").unwrap();
        assert!(holiday_pos < standup_pos);
        assert!(text.contains("Total: 2 events today"));
    }

    #[test]
    fn test_morning_summary_numbered_in_start_order() {
        let first = CalendarEvent {
            title: "Early".to_string(),
            ..event("e1", at(8, 0), at(9, 0))
        };
        let second = CalendarEvent {
            title: "Late".to_string(),
            ..event("e2", at(15, 0), at(16, 0))
        };

        let text = compose_morning_summary(&[second, first], &[], &[], "Dana");
        assert!(text.contains("1. **Early**"));
        assert!(text.contains("2. **Late**"));
    }

    #[test]
    fn test_open_tasks_capped_with_more_suffix() {
        let tasks: Vec<Task> = (0..8).map(|i| task(&format!("task-{i}"), None, None)).collect();
        let text = compose_morning_summary(&[], &[], &tasks, "Dana");
        assert!(text.contains("task-4"));
        assert!(!text.contains("task-5"));
        assert!(text.contains("+3 more"));
    }

    #[test]
    fn test_missing_times_render_tbd() {
        let mut broken = event("b", at(9, 0), at(10, 0));
        broken.start = None;
        broken.end = None;

        let text = compose_morning_summary(&[broken], &[], &[], "Dana");
        assert!(text.contains("Time TBD"));
    }

    #[test]
    fn test_clock_round_trip() {
        // Composing then re-parsing the clock string recovers hour and minute.
        for (h, m) in [(0, 0), (9, 5), (12, 0), (15, 42), (23, 59)] {
            let time = Some(EventTime::Timed(at(h, m)));
            let rendered = format_clock(time);
            let parsed = NaiveTime::parse_from_str(&rendered, "%I:%M %p").unwrap();
            assert_eq!(parsed.format("%H:%M").to_string(), at(h, m).format("%H:%M").to_string());
        }
    }

    #[test]
    fn test_countdown_formats() {
        assert_eq!(format_countdown(Duration::minutes(30)), "30m");
        assert_eq!(format_countdown(Duration::minutes(135)), "2h 15m");
        assert_eq!(format_countdown(Duration::seconds(90)), "1m");
        assert_eq!(format_countdown(Duration::seconds(59)), "0m");
        assert_eq!(format_countdown(Duration::seconds(-30)), "0m");
    }

    #[test]
    fn test_task_line_includes_priority_and_due() {
        let line = task_line(&task(
            "Pay rent",
            Some(5),
            Some(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()),
        ));
        assert_eq!(line, "Pay rent (p5, due 2025-06-30)");
    }

    #[test]
    fn test_log_type_tags() {
        assert_eq!(MessageKind::MorningSummary.log_type(), "morning_summary");
        assert_eq!(MessageKind::CurrentStatus.log_type(), "current_event_reminder");
    }
}
