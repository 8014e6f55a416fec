//! Proactive notification decision engine for Minder.
//!
//! This crate decides, for each scheduler trigger, what message (if any)
//! to push to each user's chat, and records every attempt so repeated
//! triggers stay idempotent.
//!
//! # Architecture
//!
//! ```text
//! Scheduler trigger (POST /trigger)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   NOTIFICATION ENGINE                       │
//! │                                                             │
//! │  1. Classify trigger by UTC hour                            │
//! │     (morning hour → summary, otherwise status reminder)     │
//! │         ↓                                                   │
//! │  2. Fan out over users (bounded concurrency, isolated)      │
//! │         ↓  per user                                         │
//! │  3. Consult notification log (duplicate-send policy)        │
//! │  4. Fetch merged calendar events for the window             │
//! │  5. Select active/next event, fetch sorted tasks            │
//! │  6. Compose the message body                                │
//! │  7. Deliver via MessageChannel (single attempt, timeout)    │
//! │  8. Record a notification log entry (sent or failed)        │
//! └─────────────────────────────────────────────────────────────┘
//!          ↓
//! RunSummary { kind, users_processed, messages_sent, ... }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use scheduler::{EngineConfig, NotificationEngine, MessageChannel};
//! use chrono::Utc;
//!
//! let engine = NotificationEngine::new(db, provider, channel, EngineConfig::from_env());
//! let summary = engine.run(Utc::now()).await?;
//! println!("sent {} messages", summary.messages_sent);
//! ```

mod channel;
mod engine;
mod error;

pub use channel::{LoggingChannel, MessageChannel, NoOpChannel};
pub use engine::{classify_trigger, EngineConfig, NotificationEngine, RunSummary, UserOutcome};
pub use error::SchedulerError;

// Re-export commonly used types from dependencies
pub use assistant_core::MessageKind;
