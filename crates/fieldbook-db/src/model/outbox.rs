//! Models for the transactional outbox.

use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use serde_json::Value as JsonValue;

use crate::db::schema;

/// A domain event waiting to be delivered to the notification sink.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::outbox_event)]
#[diesel(check_for_backend(Pg))]
pub struct OutboxEvent {
    pub id: uuid::Uuid,
    /// Event discriminator, e.g. `booking_confirmed`.
    pub event_type: String,
    pub recipient_id: uuid::Uuid,
    /// Serialized event body.
    pub payload: JsonValue,
    /// Delivery attempts so far.
    pub attempts: i32,
    /// Earliest time the next delivery may be attempted.
    pub available_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::outbox_event)]
pub struct NewOutboxEvent<'a> {
    pub id: uuid::Uuid,
    pub event_type: &'a str,
    pub recipient_id: uuid::Uuid,
    pub payload: JsonValue,
}
