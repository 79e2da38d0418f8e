//! Queries for the per-schedule slot catalog.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::enums::SlotStatus;
use crate::db::schema::schedule_slot;
use crate::model::schedule::{NewScheduleSlot, ScheduleSlot};

/// ## Summary
/// Returns a query selecting the slots of a schedule in time order.
#[must_use]
pub fn for_schedule(schedule_id: uuid::Uuid) -> schedule_slot::BoxedQuery<'static, diesel::pg::Pg> {
    schedule_slot::table
        .filter(schedule_slot::schedule_id.eq(schedule_id))
        .order(schedule_slot::time.asc())
        .into_boxed()
}

/// ## Summary
/// Loads every slot of a schedule, ordered by time.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn list(
    conn: &mut DbConnection<'_>,
    schedule_id: uuid::Uuid,
) -> QueryResult<Vec<ScheduleSlot>> {
    for_schedule(schedule_id)
        .select(ScheduleSlot::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Loads the slot at `time`, if the schedule's catalog contains one.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn get(
    conn: &mut DbConnection<'_>,
    schedule_id: uuid::Uuid,
    time: DateTime<Utc>,
) -> QueryResult<Option<ScheduleSlot>> {
    schedule_slot::table
        .filter(schedule_slot::schedule_id.eq(schedule_id))
        .filter(schedule_slot::time.eq(time))
        .select(ScheduleSlot::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts the generated slot catalog for a new schedule.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert_batch(
    conn: &mut DbConnection<'_>,
    slots: &[NewScheduleSlot],
) -> QueryResult<Vec<ScheduleSlot>> {
    if slots.is_empty() {
        return Ok(Vec::new());
    }

    diesel::insert_into(schedule_slot::table)
        .values(slots)
        .returning(ScheduleSlot::as_returning())
        .get_results(conn)
        .await
}

/// ## Summary
/// Moves the slot at `time` from `from` to `to` if, and only if, it is
/// currently in `from`.
///
/// This is the exclusivity point of the whole system: two concurrent
/// promotions serialize on the row lock and the loser matches zero rows.
///
/// ## Returns
/// `true` if the slot was updated.
///
/// ## Errors
/// Returns an error if the database operation fails.
#[tracing::instrument(skip(conn))]
pub async fn transition(
    conn: &mut DbConnection<'_>,
    schedule_id: uuid::Uuid,
    time: DateTime<Utc>,
    from: SlotStatus,
    to: SlotStatus,
) -> QueryResult<bool> {
    let updated = diesel::update(
        schedule_slot::table
            .filter(schedule_slot::schedule_id.eq(schedule_id))
            .filter(schedule_slot::time.eq(time))
            .filter(schedule_slot::status.eq(from)),
    )
    .set((
        schedule_slot::status.eq(to),
        schedule_slot::updated_at.eq(Utc::now()),
    ))
    .execute(conn)
    .await?;

    tracing::trace!(updated, "Slot transition applied");
    Ok(updated == 1)
}
