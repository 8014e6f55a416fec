//! Message channel trait and implementations.

use async_trait::async_trait;

use crate::error::SchedulerError;

/// Trait for delivering proactive messages to a user's chat.
///
/// Abstracted to support different transports (Telegram, tests, etc.)
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Deliver a text message to the user's chat.
    ///
    /// One attempt per call; retry policy belongs to the next trigger,
    /// not this method.
    async fn send(&self, user_id: i64, text: &str) -> Result<(), SchedulerError>;
}

/// A no-op channel for testing that discards all messages.
#[derive(Debug, Clone, Default)]
pub struct NoOpChannel;

#[async_trait]
impl MessageChannel for NoOpChannel {
    async fn send(&self, _user_id: i64, _text: &str) -> Result<(), SchedulerError> {
        Ok(())
    }
}

/// A logging channel for debugging that logs all deliveries.
#[derive(Debug, Clone, Default)]
pub struct LoggingChannel;

#[async_trait]
impl MessageChannel for LoggingChannel {
    async fn send(&self, user_id: i64, text: &str) -> Result<(), SchedulerError> {
        tracing::info!(user_id, chars = text.len(), "Sending message: {}", text);
        Ok(())
    }
}
