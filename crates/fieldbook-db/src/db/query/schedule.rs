//! Query composition for `schedule`, including the proximity candidate search.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use fieldbook_core::geo::BoundingBox;

use crate::db::connection::DbConnection;
use crate::db::enums::SlotStatus;
use crate::db::schema::{schedule, schedule_slot, technician};
use crate::model::schedule::{
    NewSchedule, NewScheduleSlot, Schedule, ScheduleSlot, ScheduleWithSlots,
};
use crate::model::technician::Technician;

use super::slot;

/// Unique constraint allowing one schedule per technician per day.
pub const TECHNICIAN_DATE_KEY: &str = "schedule_technician_date_key";

/// ## Summary
/// Returns a query to find a schedule by ID.
#[must_use]
pub fn by_id(id: uuid::Uuid) -> schedule::BoxedQuery<'static, diesel::pg::Pg> {
    schedule::table.filter(schedule::id.eq(id)).into_boxed()
}

/// ## Summary
/// Returns a query to find the schedule a technician published for `date`.
#[must_use]
pub fn by_technician_and_date(
    technician_id: uuid::Uuid,
    date: NaiveDate,
) -> schedule::BoxedQuery<'static, diesel::pg::Pg> {
    schedule::table
        .filter(schedule::technician_id.eq(technician_id))
        .filter(schedule::date.eq(date))
        .into_boxed()
}

/// ## Summary
/// Loads a schedule by ID.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn get(conn: &mut DbConnection<'_>, id: uuid::Uuid) -> QueryResult<Option<Schedule>> {
    by_id(id)
        .select(Schedule::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Loads a schedule by ID together with its slots.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn get_with_slots(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> QueryResult<Option<ScheduleWithSlots>> {
    let Some(schedule) = get(conn, id).await? else {
        return Ok(None);
    };
    let slots = slot::list(conn, schedule.id).await?;
    Ok(Some(ScheduleWithSlots { schedule, slots }))
}

/// ## Summary
/// Loads the schedule a technician published for `date`, with its slots.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn find_with_slots(
    conn: &mut DbConnection<'_>,
    technician_id: uuid::Uuid,
    date: NaiveDate,
) -> QueryResult<Option<ScheduleWithSlots>> {
    let schedule = by_technician_and_date(technician_id, date)
        .select(Schedule::as_select())
        .first(conn)
        .await
        .optional()?;
    let Some(schedule) = schedule else {
        return Ok(None);
    };
    let slots = slot::list(conn, schedule.id).await?;
    Ok(Some(ScheduleWithSlots { schedule, slots }))
}

/// ## Summary
/// Lists a technician's schedules on or after `from` with their slots,
/// earliest first.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn list_for_technician(
    conn: &mut DbConnection<'_>,
    technician_id: uuid::Uuid,
    from: NaiveDate,
) -> QueryResult<Vec<ScheduleWithSlots>> {
    let schedules = schedule::table
        .filter(schedule::technician_id.eq(technician_id))
        .filter(schedule::date.ge(from))
        .order(schedule::date.asc())
        .select(Schedule::as_select())
        .load(conn)
        .await?;

    let slots = ScheduleSlot::belonging_to(&schedules)
        .order(schedule_slot::time.asc())
        .select(ScheduleSlot::as_select())
        .load(conn)
        .await?;

    Ok(slots
        .grouped_by(&schedules)
        .into_iter()
        .zip(schedules)
        .map(|(slots, schedule)| ScheduleWithSlots { schedule, slots })
        .collect())
}

/// ## Summary
/// Inserts a schedule and its slot catalog.
///
/// Callers run this inside a transaction so a schedule never exists without
/// its slots. A second schedule for the same technician and date fails on
/// `schedule_technician_date_key`.
///
/// ## Errors
/// Returns an error if the database operation fails.
#[tracing::instrument(skip(conn, new_schedule, times), fields(schedule_id = %new_schedule.id))]
pub async fn insert_with_slots(
    conn: &mut DbConnection<'_>,
    new_schedule: &NewSchedule,
    times: &[DateTime<Utc>],
) -> QueryResult<ScheduleWithSlots> {
    let schedule = diesel::insert_into(schedule::table)
        .values(new_schedule)
        .returning(Schedule::as_returning())
        .get_result(conn)
        .await?;

    let new_slots: Vec<NewScheduleSlot> = times
        .iter()
        .map(|time| NewScheduleSlot {
            schedule_id: schedule.id,
            time: *time,
            status: SlotStatus::Available,
        })
        .collect();
    let mut slots = slot::insert_batch(conn, &new_slots).await?;
    slots.sort_by_key(|s| s.time);

    tracing::debug!(slot_count = slots.len(), "Inserted schedule slots");
    Ok(ScheduleWithSlots { schedule, slots })
}

/// ## Summary
/// Hides a schedule from search. Existing requests and bookings are untouched.
///
/// ## Returns
/// `true` if an active schedule was deactivated.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn deactivate(conn: &mut DbConnection<'_>, id: uuid::Uuid) -> QueryResult<bool> {
    let updated = diesel::update(
        schedule::table
            .filter(schedule::id.eq(id))
            .filter(schedule::is_active.eq(true)),
    )
    .set((
        schedule::is_active.eq(false),
        schedule::updated_at.eq(Utc::now()),
    ))
    .execute(conn)
    .await?;
    Ok(updated == 1)
}

/// Filter for the slot finder.
#[derive(Debug, Clone, Copy)]
pub struct CandidateFilter {
    pub service_id: uuid::Uuid,
    pub date: NaiveDate,
    pub time: DateTime<Utc>,
    pub bounds: BoundingBox,
}

/// ## Summary
/// Returns every available slot at the requested date and time whose active
/// schedule lies inside the bounding box and belongs to an approved
/// technician offering the service.
///
/// The box is a prefilter; exact distance is applied by the caller.
///
/// ## Errors
/// Returns an error if the database operation fails.
#[tracing::instrument(skip(conn))]
pub async fn candidates(
    conn: &mut DbConnection<'_>,
    filter: &CandidateFilter,
) -> QueryResult<Vec<(Schedule, ScheduleSlot, Technician)>> {
    let rows = schedule::table
        .inner_join(schedule_slot::table)
        .inner_join(technician::table)
        .filter(schedule::date.eq(filter.date))
        .filter(schedule::is_active.eq(true))
        .filter(schedule::latitude.between(filter.bounds.min_latitude, filter.bounds.max_latitude))
        .filter(
            schedule::longitude.between(filter.bounds.min_longitude, filter.bounds.max_longitude),
        )
        .filter(schedule_slot::time.eq(filter.time))
        .filter(schedule_slot::status.eq(SlotStatus::Available))
        .filter(technician::service_id.eq(filter.service_id))
        .filter(technician::is_approved.eq(true))
        .select((
            Schedule::as_select(),
            ScheduleSlot::as_select(),
            Technician::as_select(),
        ))
        .load::<(Schedule, ScheduleSlot, Technician)>(conn)
        .await?;

    tracing::debug!(candidate_count = rows.len(), "Loaded finder candidates");
    Ok(rows)
}
