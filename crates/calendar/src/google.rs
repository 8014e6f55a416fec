//! Google Calendar API v3 client.

use assistant_core::{CalendarEvent, EventStatus, EventTime};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::auth::Credentials;
use crate::error::CalendarError;
use crate::provider::{CalendarListEntry, CalendarProvider};

const API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Maximum events requested per calendar per query.
const MAX_RESULTS: u32 = 50;

/// Client for the Google Calendar REST API.
///
/// Holds a bearer token for one invocation; build a fresh client per
/// trigger with current credentials.
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    access_token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<RawEvent>,
}

/// One raw event record as returned by the API. Only the fields the bot
/// consumes are decoded; everything else is dropped at this boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start: Option<RawEventTime>,
    #[serde(default)]
    pub end: Option<RawEventTime>,
}

/// Start/end as the API encodes it: `dateTime` for timed events, bare
/// `date` for all-day events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEventTime {
    #[serde(default, rename = "dateTime")]
    pub date_time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl RawEvent {
    /// Decode into the domain event type. Unparseable times become `None`
    /// so a single bad record degrades instead of failing the batch.
    pub fn into_event(self, calendar_id: &str) -> CalendarEvent {
        let status = match self.status.as_deref() {
            Some("cancelled") => EventStatus::Cancelled,
            Some("tentative") => EventStatus::Tentative,
            _ => EventStatus::Confirmed,
        };

        CalendarEvent {
            event_id: self.id,
            calendar_id: calendar_id.to_string(),
            title: self.summary.unwrap_or_else(|| "No Title".to_string()),
            description: self.description.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            start: parse_time(self.start.as_ref()),
            end: parse_time(self.end.as_ref()),
            status,
        }
    }
}

fn parse_time(raw: Option<&RawEventTime>) -> Option<EventTime> {
    let raw = raw?;
    if let Some(date_time) = &raw.date_time {
        return DateTime::parse_from_rfc3339(date_time)
            .ok()
            .map(|t| EventTime::Timed(t.with_timezone(&Utc)));
    }
    if let Some(date) = &raw.date {
        return NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .map(EventTime::AllDay);
    }
    None
}

/// Calendar ids may contain `#` (holiday calendars), which would be read
/// as a URL fragment if left unescaped.
fn encode_calendar_id(id: &str) -> String {
    id.replace('%', "%25").replace('#', "%23").replace('/', "%2F")
}

impl GoogleCalendarClient {
    pub fn new(credentials: &Credentials) -> Result<Self, CalendarError> {
        Self::with_base_url(credentials, API_BASE)
    }

    /// Client against a custom base URL (used by tests).
    pub fn with_base_url(
        credentials: &Credentials,
        base_url: impl Into<String>,
    ) -> Result<Self, CalendarError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            access_token: credentials.access_token.clone(),
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    async fn list_calendars(&self) -> Result<Vec<CalendarListEntry>, CalendarError> {
        let url = format!("{}/users/me/calendarList", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CalendarError::Provider(format!(
                "calendarList returned {}",
                response.status()
            )));
        }

        let list: CalendarListResponse = response.json().await?;
        debug!(count = list.items.len(), "Fetched calendar list");
        Ok(list.items)
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            encode_calendar_id(calendar_id)
        );
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", time_min.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("timeMax", time_max.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("maxResults", MAX_RESULTS.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CalendarError::Provider(format!(
                "events query for {calendar_id} returned {}",
                response.status()
            )));
        }

        let events: EventsResponse = response.json().await?;
        debug!(
            calendar_id,
            count = events.items.len(),
            "Fetched events from calendar"
        );
        Ok(events
            .items
            .into_iter()
            .map(|raw| raw.into_event(calendar_id))
            .collect())
    }
}
