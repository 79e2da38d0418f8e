//! Query composition for `outbox_event`.
//!
//! Events are written in the same transaction as the state change they
//! describe and claimed later by the dispatcher with `FOR UPDATE SKIP LOCKED`,
//! so several dispatchers can share the table.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::outbox_event;
use crate::model::outbox::{NewOutboxEvent, OutboxEvent};

/// ## Summary
/// Inserts events into the outbox.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert_batch(
    conn: &mut DbConnection<'_>,
    events: &[NewOutboxEvent<'_>],
) -> QueryResult<usize> {
    if events.is_empty() {
        return Ok(0);
    }

    diesel::insert_into(outbox_event::table)
        .values(events)
        .execute(conn)
        .await
}

/// ## Summary
/// Locks up to `limit` undelivered events that are due and have not
/// exhausted their attempts, oldest first.
///
/// Must run inside a transaction; the row locks are what keep two
/// dispatchers from delivering the same event.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn claim_due(
    conn: &mut DbConnection<'_>,
    now: DateTime<Utc>,
    limit: i64,
    max_attempts: i32,
) -> QueryResult<Vec<OutboxEvent>> {
    outbox_event::table
        .filter(outbox_event::delivered_at.is_null())
        .filter(outbox_event::available_at.le(now))
        .filter(outbox_event::attempts.lt(max_attempts))
        .order(outbox_event::created_at.asc())
        .limit(limit)
        .select(OutboxEvent::as_select())
        .for_update()
        .skip_locked()
        .load(conn)
        .await
}

/// ## Summary
/// Pushes `available_at` of the claimed events to `until` so that no other
/// dispatcher picks them up while delivery happens outside the transaction.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn lease(
    conn: &mut DbConnection<'_>,
    ids: &[uuid::Uuid],
    until: DateTime<Utc>,
) -> QueryResult<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    diesel::update(outbox_event::table.filter(outbox_event::id.eq_any(ids)))
        .set(outbox_event::available_at.eq(until))
        .execute(conn)
        .await
}

/// ## Summary
/// Marks an event as delivered.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn mark_delivered(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    delivered_at: DateTime<Utc>,
) -> QueryResult<()> {
    diesel::update(outbox_event::table.filter(outbox_event::id.eq(id)))
        .set((
            outbox_event::delivered_at.eq(Some(delivered_at)),
            outbox_event::attempts.eq(outbox_event::attempts + 1),
            outbox_event::last_error.eq(None::<String>),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

/// ## Summary
/// Records a failed delivery attempt and schedules the next one.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn mark_failed(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    error: &str,
    retry_at: DateTime<Utc>,
) -> QueryResult<()> {
    diesel::update(outbox_event::table.filter(outbox_event::id.eq(id)))
        .set((
            outbox_event::attempts.eq(outbox_event::attempts + 1),
            outbox_event::last_error.eq(Some(error)),
            outbox_event::available_at.eq(retry_at),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

/// ## Summary
/// Lists undelivered events for a recipient, oldest first.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn pending_for_recipient(
    conn: &mut DbConnection<'_>,
    recipient_id: uuid::Uuid,
) -> QueryResult<Vec<OutboxEvent>> {
    outbox_event::table
        .filter(outbox_event::recipient_id.eq(recipient_id))
        .filter(outbox_event::delivered_at.is_null())
        .order(outbox_event::created_at.asc())
        .select(OutboxEvent::as_select())
        .load(conn)
        .await
}
