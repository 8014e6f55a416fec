//! Minder gateway: Telegram webhook plus the scheduler trigger endpoint.
//!
//! Routes:
//! - `POST /webhook` - incoming Telegram updates (commands, chat)
//! - `POST /trigger` - scheduler invocations of the notification engine
//! - `GET /health`
//!
//! Calendar and Telegram clients are constructed per invocation with
//! fresh credentials; the only long-lived state is the database pool.

use std::env;
use std::net::SocketAddr;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use calendar::{
    CalendarError, CredentialProvider, EnvSecrets, GoogleCalendarClient, SecretCredentialProvider,
};
use minder_database::{message_log, user, Database};
use scheduler::{EngineConfig, MessageChannel, NotificationEngine, SchedulerError};
use telegram::{TelegramClient, Update};

mod commands;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub telegram: TelegramClient,
    /// Name of the secret holding the Google OAuth credential blob.
    pub credentials_secret: String,
    pub engine_config: EngineConfig,
}

/// Delivers scheduler messages over the Telegram client.
#[derive(Clone)]
struct TelegramChannel {
    client: TelegramClient,
}

#[async_trait::async_trait]
impl MessageChannel for TelegramChannel {
    async fn send(&self, user_id: i64, text: &str) -> Result<(), SchedulerError> {
        self.client
            .send_message(user_id, text)
            .await
            .map_err(|e| SchedulerError::Delivery(e.to_string()))
    }
}

/// Build a calendar client with fresh (possibly refreshed) credentials.
pub async fn build_calendar_client(state: &AppState) -> Result<GoogleCalendarClient, CalendarError> {
    let provider = SecretCredentialProvider::new(EnvSecrets, state.credentials_secret.clone())?;
    let credentials = provider.calendar_credentials().await?;
    GoogleCalendarClient::new(&credentials)
}

#[derive(Debug, Deserialize)]
struct TriggerRequest {
    #[serde(default)]
    trigger_type: Option<String>,
    /// Opaque trigger payload, kept for audit logging only.
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct Health {
    status: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let addr = env::var("MINDER_API_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:minder.db?mode=rwc".to_string());
    let credentials_secret = env::var("GOOGLE_CREDENTIALS_SECRET")
        .unwrap_or_else(|_| "GOOGLE_CALENDAR_CREDENTIALS".to_string());

    let db = match Database::connect(&database_url).await {
        Ok(db) => db,
        Err(err) => {
            error!(error = %err, "Failed to connect to database");
            std::process::exit(1);
        }
    };
    if let Err(err) = db.migrate().await {
        error!(error = %err, "Failed to run migrations");
        std::process::exit(1);
    }

    let telegram = match TelegramClient::from_env() {
        Ok(client) => client,
        Err(err) => {
            error!(error = %err, "Failed to create Telegram client");
            std::process::exit(1);
        }
    };

    let state = AppState {
        db,
        telegram,
        credentials_secret,
        engine_config: EngineConfig::from_env(),
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .route("/trigger", post(trigger))
        .with_state(state);

    let socket_addr: SocketAddr = match addr.parse() {
        Ok(parsed) => parsed,
        Err(err) => {
            error!(addr, error = %err, "Invalid listen address");
            std::process::exit(1);
        }
    };

    info!(%socket_addr, "Minder gateway listening");
    let listener = match tokio::net::TcpListener::bind(socket_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, "Failed to bind listener");
            std::process::exit(1);
        }
    };
    if let Err(err) = axum::serve(listener, app).await {
        error!(error = %err, "Server error");
        std::process::exit(1);
    }
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}

/// Scheduler trigger entry point.
///
/// Any completed run returns 200 with the summary (per-user failures are
/// embedded in the body); 400 for a malformed trigger; 500 only when a
/// bot-wide capability (credentials, user listing) is unavailable.
async fn trigger(State(state): State<AppState>, Json(request): Json<TriggerRequest>) -> Response {
    let trigger_type = match request.trigger_type.as_deref() {
        Some(kind) if !kind.is_empty() => kind.to_string(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "missing trigger_type"})),
            )
                .into_response()
        }
    };
    info!(trigger_type, payload = ?request.payload, "Trigger received");

    let provider = match build_calendar_client(&state).await {
        Ok(provider) => provider,
        Err(err) => {
            error!(error = %err, "Calendar credentials unavailable");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "credentials unavailable"})),
            )
                .into_response();
        }
    };

    let channel = TelegramChannel {
        client: state.telegram.clone(),
    };
    let engine = NotificationEngine::new(
        state.db.clone(),
        provider,
        channel,
        state.engine_config.clone(),
    );

    match engine.run(Utc::now()).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => {
            error!(error = %err, "Notification run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": err.to_string()})),
            )
                .into_response()
        }
    }
}

/// Telegram webhook entry point.
async fn webhook(State(state): State<AppState>, Json(update): Json<Update>) -> Response {
    let Some(message) = update.message else {
        info!(update_id = update.update_id, "Update without message, ignoring");
        return (StatusCode::OK, Json(json!({"status": "ignored"}))).into_response();
    };
    let Some(text) = message.text else {
        info!("Non-text message, ignoring");
        return (StatusCode::OK, Json(json!({"status": "ignored"}))).into_response();
    };

    let chat_id = message.chat.id;
    let (display_name, username) = match message.from {
        Some(from) if !from.first_name.is_empty() => (from.first_name, from.username),
        _ => ("User".to_string(), None),
    };
    info!(chat_id, %display_name, "Processing message: {}", text);

    // Register or refresh the user on any interaction. Command handling
    // proceeds even if this fails.
    if let Err(err) = user::upsert_user(state.db.pool(), chat_id, &display_name, username.as_deref()).await
    {
        error!(chat_id, error = %err, "Failed to store user profile");
    }
    if let Err(err) = message_log::append(state.db.pool(), chat_id, "user", &text, Utc::now()).await
    {
        warn!(chat_id, error = %err, "Failed to log inbound message");
    }

    let reply = commands::handle(&state, chat_id, &display_name, &text).await;

    if let Err(err) = message_log::append(state.db.pool(), chat_id, "bot", &reply, Utc::now()).await
    {
        warn!(chat_id, error = %err, "Failed to log reply");
    }
    if let Err(err) = state.telegram.send_message(chat_id, &reply).await {
        error!(chat_id, error = %err, "Failed to send reply");
    }

    (StatusCode::OK, Json(json!({"status": "ok"}))).into_response()
}
