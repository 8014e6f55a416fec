//! Credential retrieval and refresh.
//!
//! Credentials come from an opaque secret blob (a JSON document with the
//! OAuth fields) and are refreshed against the token endpoint when
//! expired. Providers are constructed per invocation; nothing here is a
//! process-wide singleton.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::info;

use crate::error::CalendarError;

/// Opaque named-secret retrieval.
pub trait SecretStore: Send + Sync {
    fn get(&self, name: &str) -> Result<String, CalendarError>;
}

/// Secret store backed by environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvSecrets;

impl SecretStore for EnvSecrets {
    fn get(&self, name: &str) -> Result<String, CalendarError> {
        std::env::var(name).map_err(|_| CalendarError::Secret(name.to_string()))
    }
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// OAuth credentials for the calendar provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// Access token expiry; refresh happens when this has passed.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Whether the access token has expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |expiry| expiry <= now)
    }
}

/// Source of valid calendar credentials, refreshing opaquely on expiry.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn calendar_credentials(&self) -> Result<Credentials, CalendarError>;
}

/// Credential provider that reads a JSON secret and refreshes expired
/// access tokens against the OAuth token endpoint.
pub struct SecretCredentialProvider<S: SecretStore> {
    secrets: S,
    secret_name: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl<S: SecretStore> SecretCredentialProvider<S> {
    pub fn new(secrets: S, secret_name: impl Into<String>) -> Result<Self, CalendarError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            secrets,
            secret_name: secret_name.into(),
            http,
        })
    }

    async fn refresh(&self, credentials: &mut Credentials) -> Result<(), CalendarError> {
        let refresh_token = credentials
            .refresh_token
            .as_deref()
            .ok_or_else(|| CalendarError::Auth("access token expired and no refresh token".to_string()))?;
        let client_id = credentials
            .client_id
            .as_deref()
            .ok_or_else(|| CalendarError::Auth("missing client_id for token refresh".to_string()))?;
        let client_secret = credentials
            .client_secret
            .as_deref()
            .ok_or_else(|| CalendarError::Auth("missing client_secret for token refresh".to_string()))?;

        let response = self
            .http
            .post(&credentials.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CalendarError::Auth(format!(
                "token refresh failed with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await?;
        credentials.access_token = token.access_token;
        credentials.expires_at = token
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));

        info!("Calendar credentials refreshed");
        Ok(())
    }
}

#[async_trait]
impl<S: SecretStore> CredentialProvider for SecretCredentialProvider<S> {
    async fn calendar_credentials(&self) -> Result<Credentials, CalendarError> {
        let blob = self.secrets.get(&self.secret_name)?;
        let mut credentials: Credentials = serde_json::from_str(&blob)
            .map_err(|e| CalendarError::Auth(format!("malformed credential secret: {e}")))?;

        if credentials.is_expired(Utc::now()) {
            self.refresh(&mut credentials).await?;
        }

        Ok(credentials)
    }
}
