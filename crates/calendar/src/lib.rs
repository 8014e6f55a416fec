//! Google Calendar client and multi-calendar aggregation for Minder.
//!
//! This crate owns the calendar side of the bot:
//!
//! - [`CredentialProvider`] / [`SecretStore`] - credential retrieval with
//!   opaque refresh-on-expiry
//! - [`CalendarProvider`] - read access to the account's calendars, with
//!   [`GoogleCalendarClient`] as the production implementation
//! - [`fetch_merged`] - merge events across all accessible calendars,
//!   skipping calendars that fail
//!
//! Clients are built per invocation with fresh credentials; nothing is
//! cached process-wide.

mod aggregator;
mod auth;
mod error;
mod google;
mod provider;

pub use aggregator::fetch_merged;
pub use auth::{
    CredentialProvider, Credentials, EnvSecrets, SecretCredentialProvider, SecretStore,
};
pub use error::CalendarError;
pub use google::{GoogleCalendarClient, RawEvent, RawEventTime};
pub use provider::{AccessRole, CalendarListEntry, CalendarProvider};
