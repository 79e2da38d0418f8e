//! Outbox dispatcher.
//!
//! ## Summary
//! One pass claims a batch of due events with `FOR UPDATE SKIP LOCKED`,
//! leases them, commits, and only then talks to the sink. Failures are
//! rescheduled with linear backoff until the attempt limit is reached.

use chrono::{DateTime, Duration, Utc};
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;

use fieldbook_core::config::NotificationsConfig;
use fieldbook_db::db::connection::DbConnection;
use fieldbook_db::db::query::outbox;
use fieldbook_db::model::outbox::OutboxEvent;

use super::DomainEvent;
use super::sink::{Notification, NotificationSink, SinkError};
use crate::error::ServiceResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    pub batch_size: i64,
    pub max_attempts: i32,
    pub retry_backoff: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            max_attempts: 5,
            retry_backoff: Duration::seconds(30),
        }
    }
}

impl From<&NotificationsConfig> for DispatchConfig {
    fn from(config: &NotificationsConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            max_attempts: config.max_attempts,
            retry_backoff: Duration::seconds(config.retry_backoff_secs),
        }
    }
}

impl DispatchConfig {
    /// Next attempt time after `attempts` failures so far (linear backoff).
    #[must_use]
    pub fn retry_at(&self, now: DateTime<Utc>, attempts: i32) -> DateTime<Utc> {
        now + self.retry_backoff * (attempts.max(0) + 1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub claimed: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// ## Summary
/// Builds the sink-facing notification for a stored event.
///
/// ## Errors
/// Returns `Undeliverable` if the payload is not a known event.
pub fn to_notification(event: &OutboxEvent) -> Result<Notification, SinkError> {
    let domain: DomainEvent = serde_json::from_value(event.payload.clone())
        .map_err(|e| SinkError::Undeliverable(format!("{}: {e}", event.event_type)))?;

    Ok(Notification {
        event_id: event.id,
        recipient_id: event.recipient_id,
        category: domain.category(),
        message: domain.message(),
        payload: event.payload.clone(),
    })
}

/// ## Summary
/// Runs one dispatch pass.
///
/// ## Errors
/// Returns an error only for database failures; sink failures are recorded
/// on the event and counted in the report.
#[tracing::instrument(skip(conn, sink))]
pub async fn dispatch_once(
    conn: &mut DbConnection<'_>,
    sink: &dyn NotificationSink,
    config: &DispatchConfig,
) -> ServiceResult<DispatchReport> {
    let now = Utc::now();
    let lease_until = config.retry_at(now, 0);
    let batch_size = config.batch_size;
    let max_attempts = config.max_attempts;

    let claimed = conn
        .transaction::<_, crate::error::ServiceError, _>(move |tx| {
            async move {
                let events = outbox::claim_due(tx, now, batch_size, max_attempts).await?;
                let ids: Vec<uuid::Uuid> = events.iter().map(|e| e.id).collect();
                outbox::lease(tx, &ids, lease_until).await?;
                Ok(events)
            }
            .scope_boxed()
        })
        .await?;

    let mut report = DispatchReport {
        claimed: claimed.len(),
        ..DispatchReport::default()
    };

    for event in &claimed {
        let outcome = match to_notification(event) {
            Ok(notification) => sink.notify(&notification).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                outbox::mark_delivered(conn, event.id, Utc::now()).await?;
                report.delivered += 1;
            }
            Err(e) => {
                let retry_at = config.retry_at(Utc::now(), event.attempts);
                tracing::warn!(
                    event_id = %event.id,
                    attempts = event.attempts + 1,
                    error = %e,
                    "Notification delivery failed"
                );
                outbox::mark_failed(conn, event.id, &e.to_string(), retry_at).await?;
                report.failed += 1;
            }
        }
    }

    if report.claimed > 0 {
        tracing::debug!(?report, "Dispatch pass finished");
    }
    Ok(report)
}
