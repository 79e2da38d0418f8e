//! Notification sinks.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use super::Category;

/// A message ready for delivery to one recipient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub event_id: uuid::Uuid,
    pub recipient_id: uuid::Uuid,
    pub category: Category,
    pub message: String,
    pub payload: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sink rejected notification with status {0}")]
    Rejected(u16),

    #[error("Undeliverable event: {0}")]
    Undeliverable(String),
}

pub type SinkResult = std::result::Result<(), SinkError>;

/// Fire-and-forget delivery channel.
pub trait NotificationSink: Send + Sync {
    fn notify<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = SinkResult> + Send + 'a>>;
}

/// Writes notifications to the log. Used when no webhook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = SinkResult> + Send + 'a>> {
        Box::pin(async move {
            tracing::info!(
                event_id = %notification.event_id,
                recipient_id = %notification.recipient_id,
                category = ?notification.category,
                message = %notification.message,
                "Notification"
            );
            Ok(())
        })
    }
}

/// POSTs each notification as JSON to a webhook.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    /// ## Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl NotificationSink for WebhookSink {
    fn notify<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = SinkResult> + Send + 'a>> {
        Box::pin(async move {
            let response = self.client.post(&self.url).json(notification).send().await?;
            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                tracing::warn!(
                    event_id = %notification.event_id,
                    status = status.as_u16(),
                    "Webhook rejected notification"
                );
                Err(SinkError::Rejected(status.as_u16()))
            }
        })
    }
}
