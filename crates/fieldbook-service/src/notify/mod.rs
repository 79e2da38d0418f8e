//! Domain events and their delivery.
//!
//! ## Summary
//! State-changing services append [`DomainEvent`]s to the outbox in the same
//! transaction as the change. The dispatcher later hands them to a
//! [`sink::NotificationSink`]; a failed delivery is retried and never rolls
//! back the change that produced it.

pub mod dispatch;
pub mod sink;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldbook_core::types::PaymentMode;
use fieldbook_db::db::connection::DbConnection;
use fieldbook_db::db::query::outbox;
use fieldbook_db::model::outbox::NewOutboxEvent;

use crate::error::ServiceResult;

/// Coarse grouping used by notification channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Request,
    Booking,
    Payment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A customer asked for one of the technician's slots.
    RequestSubmitted {
        request_id: uuid::Uuid,
        schedule_id: uuid::Uuid,
        customer_id: uuid::Uuid,
        technician_id: uuid::Uuid,
        time: DateTime<Utc>,
    },
    /// The request was declined or lost the slot to another customer.
    RequestRejected {
        request_id: uuid::Uuid,
        customer_id: uuid::Uuid,
        time: DateTime<Utc>,
    },
    BookingConfirmed {
        booking_id: uuid::Uuid,
        request_id: uuid::Uuid,
        customer_id: uuid::Uuid,
        technician_id: uuid::Uuid,
        time: DateTime<Utc>,
    },
    BookingCancelled {
        booking_id: uuid::Uuid,
        cancelled_by: uuid::Uuid,
        recipient_id: uuid::Uuid,
        time: DateTime<Utc>,
    },
    PaymentSettled {
        booking_id: uuid::Uuid,
        payment_id: uuid::Uuid,
        recipient_id: uuid::Uuid,
        amount: i64,
        currency: String,
        mode: PaymentMode,
    },
}

impl DomainEvent {
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::RequestSubmitted { .. } => "request_submitted",
            Self::RequestRejected { .. } => "request_rejected",
            Self::BookingConfirmed { .. } => "booking_confirmed",
            Self::BookingCancelled { .. } => "booking_cancelled",
            Self::PaymentSettled { .. } => "payment_settled",
        }
    }

    /// The user who should hear about this event.
    #[must_use]
    pub const fn recipient(&self) -> uuid::Uuid {
        match self {
            Self::RequestSubmitted { technician_id, .. } => *technician_id,
            Self::RequestRejected { customer_id, .. }
            | Self::BookingConfirmed { customer_id, .. } => *customer_id,
            Self::BookingCancelled { recipient_id, .. }
            | Self::PaymentSettled { recipient_id, .. } => *recipient_id,
        }
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::RequestSubmitted { .. } | Self::RequestRejected { .. } => Category::Request,
            Self::BookingConfirmed { .. } | Self::BookingCancelled { .. } => Category::Booking,
            Self::PaymentSettled { .. } => Category::Payment,
        }
    }

    /// Human-readable notification text.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::RequestSubmitted { time, .. } => {
                format!("New booking request for {}", time.format("%Y-%m-%d %H:%M UTC"))
            }
            Self::RequestRejected { time, .. } => format!(
                "Your request for {} could not be accepted",
                time.format("%Y-%m-%d %H:%M UTC")
            ),
            Self::BookingConfirmed { time, .. } => format!(
                "Your booking for {} is confirmed",
                time.format("%Y-%m-%d %H:%M UTC")
            ),
            Self::BookingCancelled { time, .. } => format!(
                "The booking for {} was cancelled",
                time.format("%Y-%m-%d %H:%M UTC")
            ),
            Self::PaymentSettled {
                amount,
                currency,
                mode,
                ..
            } => format!("Payment of {amount} {currency} received ({mode})"),
        }
    }
}

/// ## Summary
/// Appends events to the outbox on the caller's connection, normally the
/// open transaction of the state change.
///
/// ## Errors
/// Returns an error if serialization or the insert fails.
pub async fn enqueue(conn: &mut DbConnection<'_>, events: &[DomainEvent]) -> ServiceResult<()> {
    let rows = events
        .iter()
        .map(|event| {
            Ok(NewOutboxEvent {
                id: uuid::Uuid::now_v7(),
                event_type: event.event_type(),
                recipient_id: event.recipient(),
                payload: serde_json::to_value(event)?,
            })
        })
        .collect::<ServiceResult<Vec<_>>>()?;

    let inserted = outbox::insert_batch(conn, &rows).await?;
    tracing::debug!(inserted, "Enqueued domain events");
    Ok(())
}
