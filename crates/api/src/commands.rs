//! Interactive command parsing and handling.
//!
//! Commands are thin: parse the text, call the store or the calendar, and
//! reply with a short human-readable string. Lookup failures (unknown or
//! ambiguous task names) are surfaced verbatim to the user, never
//! resolved by picking an arbitrary match.

use assistant_core::{compose, select, timewindow};
use calendar::fetch_merged;
use chrono::{NaiveDate, Utc};
use minder_database::{task, user, DatabaseError};
use tracing::error;

use crate::{build_calendar_client, AppState};

/// Help text shown for /help.
pub const HELP_TEXT: &str = "🤖 **Minder Commands**\n\n\
**Basic:**\n\
/start - Register and get a welcome message\n\
/help - Show this message\n\
/status - What's happening right now\n\
/today - Today's full schedule\n\n\
**Tasks:**\n\
/tasks - List open tasks\n\
/addtask <name> [| p<1-5>] [| YYYY-MM-DD] - Add a task\n\
/edittask <name> [| p<1-5>] [| YYYY-MM-DD] - Change priority or due date\n\
/done <name> - Mark a task complete\n\
/deletetask <name> - Delete a task\n\n\
**Settings:**\n\
/timezone <name> - Set your timezone";

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Status,
    Today,
    Tasks,
    AddTask {
        name: String,
        priority: Option<u8>,
        due_date: Option<NaiveDate>,
    },
    EditTask {
        name: String,
        priority: Option<u8>,
        due_date: Option<NaiveDate>,
    },
    Done { name: String },
    DeleteTask { name: String },
    Timezone { timezone: String },
    Unknown(String),
}

/// Parse a message into a command. Non-command text maps to `Unknown`.
pub fn parse(text: &str) -> Command {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return Command::Unknown(trimmed.to_string());
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (trimmed, ""),
    };
    // "/help@minder_bot" arrives in group chats.
    let word = word.split('@').next().unwrap_or(word);

    match word {
        "/start" => Command::Start,
        "/help" => Command::Help,
        "/status" => Command::Status,
        "/today" | "/calendar" => Command::Today,
        "/tasks" => Command::Tasks,
        "/addtask" => {
            let (name, priority, due_date) = parse_task_fields(rest);
            Command::AddTask {
                name,
                priority,
                due_date,
            }
        }
        "/edittask" => {
            let (name, priority, due_date) = parse_task_fields(rest);
            Command::EditTask {
                name,
                priority,
                due_date,
            }
        }
        "/done" => Command::Done {
            name: rest.to_string(),
        },
        "/deletetask" => Command::DeleteTask {
            name: rest.to_string(),
        },
        "/timezone" => Command::Timezone {
            timezone: rest.to_string(),
        },
        _ => Command::Unknown(trimmed.to_string()),
    }
}

/// Split "/addtask"-style arguments: name, then optional `p<1-5>` and
/// `YYYY-MM-DD` segments separated by `|`.
fn parse_task_fields(args: &str) -> (String, Option<u8>, Option<NaiveDate>) {
    let mut segments = args.split('|').map(str::trim);
    let name = segments.next().unwrap_or("").to_string();

    let mut priority = None;
    let mut due_date = None;
    for segment in segments {
        if let Some(value) = segment.strip_prefix('p').and_then(|v| v.parse::<u8>().ok()) {
            if (1..=5).contains(&value) {
                priority = Some(value);
            }
        } else if let Ok(date) = NaiveDate::parse_from_str(segment, "%Y-%m-%d") {
            due_date = Some(date);
        }
    }

    (name, priority, due_date)
}

/// Handle a message and produce the reply text.
pub async fn handle(state: &AppState, user_id: i64, display_name: &str, text: &str) -> String {
    let pool = state.db.pool();

    match parse(text) {
        Command::Start => format!(
            "👋 Hello {display_name}! I'm your personal assistant.\n\n\
             I can help you with:\n\
             • 📅 Calendar reminders and daily summaries\n\
             • ✅ Task tracking with priorities and due dates\n\
             • ⏰ Proactive notifications\n\n\
             Use /help to see all available commands!"
        ),
        Command::Help => HELP_TEXT.to_string(),
        Command::Status => status_reply(state, user_id, display_name).await,
        Command::Today => today_reply(state, user_id, display_name).await,
        Command::Tasks => match task::list_incomplete(pool, user_id).await {
            Ok(tasks) if tasks.is_empty() => {
                "No open tasks. Add one with /addtask <name>".to_string()
            }
            Ok(tasks) => {
                let mut reply = format!("🗒 **Open Tasks** ({})\n", tasks.len());
                for task in &tasks {
                    reply.push_str(&format!("• {}\n", compose_task_line(task)));
                }
                reply
            }
            Err(err) => reply_for_error("list tasks", err),
        },
        Command::AddTask {
            name,
            priority,
            due_date,
        } => {
            if name.is_empty() {
                return "Usage: /addtask <name> [| p<1-5>] [| YYYY-MM-DD]".to_string();
            }
            match task::add_task(pool, user_id, &name, priority, due_date, Utc::now().date_naive())
                .await
            {
                Ok(task) => format!("Added: {}", compose_task_line(&task)),
                Err(err) => reply_for_error("add task", err),
            }
        }
        Command::EditTask {
            name,
            priority,
            due_date,
        } => {
            if name.is_empty() {
                return "Usage: /edittask <name> [| p<1-5>] [| YYYY-MM-DD]".to_string();
            }
            match task::find_by_name(pool, user_id, &name).await {
                Ok(mut found) => {
                    if priority.is_some() {
                        found.priority = priority;
                    }
                    if due_date.is_some() {
                        found.due_date = due_date;
                    }
                    match task::update_task(pool, &found).await {
                        Ok(()) => format!("Updated: {}", compose_task_line(&found)),
                        Err(err) => reply_for_error("edit task", err),
                    }
                }
                Err(err) => reply_for_error("edit task", err),
            }
        }
        Command::Done { name } => {
            if name.is_empty() {
                return "Usage: /done <task name>".to_string();
            }
            match task::find_by_name(pool, user_id, &name).await {
                Ok(found) => match task::complete_task(pool, user_id, &found.task_id).await {
                    Ok(()) => format!("Done: {} ✅", found.name),
                    Err(err) => reply_for_error("complete task", err),
                },
                Err(err) => reply_for_error("complete task", err),
            }
        }
        Command::DeleteTask { name } => {
            if name.is_empty() {
                return "Usage: /deletetask <task name>".to_string();
            }
            match task::find_by_name(pool, user_id, &name).await {
                Ok(found) => match task::delete_task(pool, user_id, &found.task_id).await {
                    Ok(()) => format!("Deleted: {}", found.name),
                    Err(err) => reply_for_error("delete task", err),
                },
                Err(err) => reply_for_error("delete task", err),
            }
        }
        Command::Timezone { timezone } => {
            if timezone.is_empty() {
                return "Usage: /timezone <IANA name, e.g. America/Los_Angeles>".to_string();
            }
            match user::set_timezone(pool, user_id, &timezone).await {
                Ok(()) => format!("Timezone set to {timezone}."),
                Err(DatabaseError::NotFound { .. }) => {
                    "Send /start first so I can set up your profile.".to_string()
                }
                Err(err) => reply_for_error("set timezone", err),
            }
        }
        Command::Unknown(_) => {
            "💬 I track your calendar and tasks. Try /status for what's happening \
             now, or /help for everything I can do."
                .to_string()
        }
    }
}

/// On-demand current-status report (same composition as the proactive
/// reminder).
async fn status_reply(state: &AppState, user_id: i64, display_name: &str) -> String {
    let provider = match build_calendar_client(state).await {
        Ok(provider) => provider,
        Err(err) => {
            error!(user_id, error = %err, "Calendar unavailable for /status");
            return "Calendar is unavailable right now, please try again later.".to_string();
        }
    };

    let now = Utc::now();
    let (window_start, window_end) = timewindow::current_status_window(now);
    let events = fetch_merged(&provider, window_start, window_end).await;
    let selection = select(&events, now);

    let tasks = match task::list_incomplete(state.db.pool(), user_id).await {
        Ok(tasks) => tasks,
        Err(err) => return reply_for_error("list tasks", err),
    };

    compose::compose_current_status(&selection, &tasks, display_name, now)
}

/// On-demand daily schedule (same composition as the morning summary).
async fn today_reply(state: &AppState, user_id: i64, display_name: &str) -> String {
    let provider = match build_calendar_client(state).await {
        Ok(provider) => provider,
        Err(err) => {
            error!(user_id, error = %err, "Calendar unavailable for /today");
            return "Calendar is unavailable right now, please try again later.".to_string();
        }
    };

    let now = Utc::now();
    let (window_start, window_end) = timewindow::today_window(now);
    let events = fetch_merged(&provider, window_start, window_end).await;

    let pool = state.db.pool();
    let due_today = match task::list_due_today(pool, user_id, now.date_naive()).await {
        Ok(tasks) => tasks,
        Err(err) => return reply_for_error("list tasks", err),
    };
    let incomplete = match task::list_incomplete(pool, user_id).await {
        Ok(tasks) => tasks,
        Err(err) => return reply_for_error("list tasks", err),
    };

    compose::compose_morning_summary(&events, &due_today, &incomplete, display_name)
}

fn compose_task_line(task: &assistant_core::Task) -> String {
    let mut line = task.name.clone();
    let mut extras = Vec::new();
    if let Some(priority) = task.priority {
        extras.push(format!("p{priority}"));
    }
    if let Some(due) = task.due_date {
        extras.push(format!("due {due}"));
    }
    if !extras.is_empty() {
        line.push_str(&format!(" ({})", extras.join(", ")));
    }
    line
}

/// Short user-facing reply for a store failure. Lookup errors pass
/// through; anything else is logged and collapsed to a generic line.
fn reply_for_error(action: &str, err: DatabaseError) -> String {
    match err {
        DatabaseError::NotFound { id, .. } => {
            format!("No task named \"{id}\". Check /tasks for the exact name.")
        }
        DatabaseError::Ambiguous { name, count, .. } => {
            format!("{count} tasks match \"{name}\". Rename one or be more specific.")
        }
        other => {
            error!(action, error = %other, "Command failed");
            "Something went wrong, please try again.".to_string()
        }
    }
}
