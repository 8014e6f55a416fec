//! The proactive notification decision engine.
//!
//! One engine run corresponds to one scheduler trigger. The engine holds
//! no state of its own between runs; the notification log is the only
//! memory, and it lives in the database.

use std::time::Duration;

use assistant_core::{compose, select, timewindow, MessageKind};
use calendar::{fetch_merged, CalendarProvider};
use chrono::{DateTime, Timelike, Utc};
use futures::stream::{self, StreamExt};
use minder_database::{notification, task, user, Database, User};
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::channel::MessageChannel;
use crate::error::SchedulerError;

/// Default UTC hour for the morning summary.
const DEFAULT_MORNING_HOUR: u32 = 7;

/// Default bound on concurrently processed users.
const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Default timeout for one outbound delivery.
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the notification engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// UTC hour at which the trigger is classified as a morning summary.
    pub morning_hour: u32,

    /// Skip a user when a notification of the same kind already went out
    /// this period (same UTC hour for status reminders, same UTC day for
    /// morning summaries). The log is written either way; this only
    /// controls suppression.
    pub suppress_repeats: bool,

    /// Maximum users processed concurrently.
    pub max_concurrency: usize,

    /// Timeout for one outbound delivery attempt.
    pub send_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            morning_hour: DEFAULT_MORNING_HOUR,
            suppress_repeats: true,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// Build a config from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            morning_hour: std::env::var("MORNING_HOUR")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|h| *h < 24)
                .unwrap_or(defaults.morning_hour),
            suppress_repeats: std::env::var("SUPPRESS_REPEATS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.suppress_repeats),
            max_concurrency: std::env::var("MAX_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_concurrency),
            send_timeout: defaults.send_timeout,
        }
    }
}

/// Classify an invocation time into the message kind it produces.
pub fn classify_trigger(morning_hour: u32, now: DateTime<Utc>) -> MessageKind {
    if now.hour() == morning_hour {
        MessageKind::MorningSummary
    } else {
        MessageKind::CurrentStatus
    }
}

/// Outcome of processing one user.
#[derive(Debug, Clone, Serialize)]
pub struct UserOutcome {
    pub user_id: i64,
    pub user_name: String,
    /// Events reflected in the message: the full day count for morning
    /// summaries, 1/0 for an active event on status reminders.
    pub events_found: i64,
    pub message_sent: bool,
    /// True when the duplicate-send policy suppressed this user.
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UserOutcome {
    fn failed(user: &User, error: &SchedulerError) -> Self {
        Self {
            user_id: user.user_id,
            user_name: user.display_name.clone(),
            events_found: 0,
            message_sent: false,
            skipped: false,
            error: Some(error.to_string()),
        }
    }
}

/// Terminal state of one engine run, returned to the invoking trigger.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub kind: MessageKind,
    pub users_processed: usize,
    pub messages_sent: usize,
    pub total_events_found: i64,
    pub results: Vec<UserOutcome>,
}

/// Coordinates one notification run: classify the trigger, fan out over
/// users, and for each user gather, compose, deliver, and record.
pub struct NotificationEngine<P: CalendarProvider, C: MessageChannel> {
    db: Database,
    provider: P,
    channel: C,
    config: EngineConfig,
}

impl<P: CalendarProvider, C: MessageChannel> NotificationEngine<P, C> {
    /// Create an engine for one invocation.
    pub fn new(db: Database, provider: P, channel: C, config: EngineConfig) -> Self {
        Self {
            db,
            provider,
            channel,
            config,
        }
    }

    /// Run the engine at the given instant.
    ///
    /// Fails only when a bot-wide capability is unavailable (user listing);
    /// everything scoped to one user or one calendar is contained in that
    /// unit's outcome.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunSummary, SchedulerError> {
        let kind = classify_trigger(self.config.morning_hour, now);
        info!(kind = kind.log_type(), %now, "Notification run started");

        let users = user::list_users(self.db.pool()).await?;
        if users.is_empty() {
            info!("No active users found");
            return Ok(RunSummary {
                kind,
                users_processed: 0,
                messages_sent: 0,
                total_events_found: 0,
                results: Vec::new(),
            });
        }

        let results: Vec<UserOutcome> = stream::iter(users)
            .map(|user| self.process_user(user, kind, now))
            .buffer_unordered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let summary = RunSummary {
            kind,
            users_processed: results.len(),
            messages_sent: results.iter().filter(|r| r.message_sent).count(),
            total_events_found: results.iter().map(|r| r.events_found).sum(),
            results,
        };

        info!(
            kind = kind.log_type(),
            users = summary.users_processed,
            sent = summary.messages_sent,
            events = summary.total_events_found,
            "Notification run complete"
        );
        Ok(summary)
    }

    /// Process one user, containing any failure in the outcome so other
    /// users are unaffected.
    async fn process_user(&self, user: User, kind: MessageKind, now: DateTime<Utc>) -> UserOutcome {
        match self.try_process_user(&user, kind, now).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(user_id = user.user_id, error = %err, "User processing failed");
                UserOutcome::failed(&user, &err)
            }
        }
    }

    async fn try_process_user(
        &self,
        user: &User,
        kind: MessageKind,
        now: DateTime<Utc>,
    ) -> Result<UserOutcome, SchedulerError> {
        let pool = self.db.pool();

        if self.config.suppress_repeats {
            if let Some(last) = notification::last_sent(pool, user.user_id, kind).await? {
                if same_period(kind, last, now) {
                    debug!(
                        user_id = user.user_id,
                        kind = kind.log_type(),
                        %last,
                        "Already notified this period, skipping"
                    );
                    return Ok(UserOutcome {
                        user_id: user.user_id,
                        user_name: user.display_name.clone(),
                        events_found: 0,
                        message_sent: false,
                        skipped: true,
                        error: None,
                    });
                }
            }
        }

        let (message, events_found) = match kind {
            MessageKind::MorningSummary => {
                let (window_start, window_end) = timewindow::today_window(now);
                let events = fetch_merged(&self.provider, window_start, window_end).await;
                let due_today = task::list_due_today(pool, user.user_id, now.date_naive()).await?;
                let incomplete = task::list_incomplete(pool, user.user_id).await?;
                let message = compose::compose_morning_summary(
                    &events,
                    &due_today,
                    &incomplete,
                    &user.display_name,
                );
                (message, events.len() as i64)
            }
            MessageKind::CurrentStatus => {
                let (window_start, window_end) = timewindow::current_status_window(now);
                let events = fetch_merged(&self.provider, window_start, window_end).await;
                let selection = select(&events, now);
                let tasks = task::list_incomplete(pool, user.user_id).await?;
                let events_found = i64::from(selection.active.is_some());
                let message = compose::compose_current_status(
                    &selection,
                    &tasks,
                    &user.display_name,
                    now,
                );
                (message, events_found)
            }
        };

        let delivered = match timeout(
            self.config.send_timeout,
            self.channel.send(user.user_id, &message),
        )
        .await
        {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!(user_id = user.user_id, error = %err, "Delivery failed");
                false
            }
            Err(_) => {
                warn!(user_id = user.user_id, "Delivery timed out");
                false
            }
        };

        notification::log_notification(
            pool,
            user.user_id,
            kind,
            &message,
            events_found,
            delivered,
            now,
        )
        .await?;

        Ok(UserOutcome {
            user_id: user.user_id,
            user_name: user.display_name.clone(),
            events_found,
            message_sent: delivered,
            skipped: false,
            error: None,
        })
    }
}

/// Whether a previous send falls in the same logical period as `now`:
/// the same UTC day for morning summaries, the same UTC hour for status
/// reminders.
fn same_period(kind: MessageKind, last: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    match kind {
        MessageKind::MorningSummary => last.date_naive() == now.date_naive(),
        MessageKind::CurrentStatus => {
            last.date_naive() == now.date_naive() && last.hour() == now.hour()
        }
    }
}
