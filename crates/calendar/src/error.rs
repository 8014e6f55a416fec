//! Error types for calendar operations.

use thiserror::Error;

/// Errors that can occur while talking to the calendar provider.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// Credential retrieval or refresh failed.
    #[error("auth error: {0}")]
    Auth(String),

    /// A secret required for credentials is missing.
    #[error("secret not available: {0}")]
    Secret(String),

    /// HTTP transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned something unexpected.
    #[error("provider error: {0}")]
    Provider(String),
}
