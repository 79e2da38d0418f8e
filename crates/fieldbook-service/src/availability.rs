//! Geo-availability index: one schedule per technician per day.

use chrono::{DateTime, NaiveDate, Utc};
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use serde::Deserialize;

use fieldbook_core::geo::GeoPoint;
use fieldbook_core::types::{Address, Role};
use fieldbook_db::db::connection::DbConnection;
use fieldbook_db::db::query::{schedule, technician};
use fieldbook_db::model::schedule::NewSchedule;

use crate::error::{ServiceError, ServiceResult};
use crate::identity::Actor;
use crate::rules::BookingRules;
use crate::view::ScheduleView;

/// Input for [`publish`].
#[derive(Debug, Clone, Deserialize)]
pub struct PublishSchedule {
    pub date: NaiveDate,
    pub address: Address,
    /// `[longitude, latitude]`
    pub coordinates: Vec<f64>,
}

/// ## Summary
/// Publishes the acting technician's availability for one date with the full
/// slot catalog available.
///
/// ## Errors
/// - `Forbidden` if the actor is not a technician
/// - `ValidationError` for a bad address or point, or a date in the past
/// - `NotApproved` if the technician has not completed verification
/// - `AlreadyExists` if a schedule for that date exists
#[tracing::instrument(
    skip(conn, rules, input),
    fields(technician_id = %actor.id, date = %input.date)
)]
pub async fn publish(
    conn: &mut DbConnection<'_>,
    actor: &Actor,
    rules: &BookingRules,
    input: &PublishSchedule,
    now: DateTime<Utc>,
) -> ServiceResult<ScheduleView> {
    actor.require_role(Role::Technician)?;
    input.address.validate()?;
    let point = GeoPoint::from_coordinates(&input.coordinates)?;

    let today = rules.catalog.local_date(now);
    if input.date < today {
        return Err(ServiceError::ValidationError(format!(
            "cannot publish availability for {} which is before {today}",
            input.date
        )));
    }

    let profile = technician::get(conn, actor.id).await?;
    if !profile.is_some_and(|t| t.is_approved) {
        return Err(ServiceError::NotApproved);
    }

    if schedule::find_with_slots(conn, actor.id, input.date)
        .await?
        .is_some()
    {
        return Err(ServiceError::AlreadyExists("Schedule".to_string()));
    }

    let new_schedule = NewSchedule {
        id: uuid::Uuid::now_v7(),
        technician_id: actor.id,
        date: input.date,
        address: serde_json::to_value(&input.address)?,
        longitude: point.longitude,
        latitude: point.latitude,
    };
    let times = rules.catalog.times_for(input.date);

    let created = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move { Ok(schedule::insert_with_slots(tx, &new_schedule, &times).await?) }
                .scope_boxed()
        })
        .await
        .map_err(|e| match e {
            ServiceError::StorageError(db)
                if db.is_unique_violation(Some(schedule::TECHNICIAN_DATE_KEY)) =>
            {
                ServiceError::AlreadyExists("Schedule".to_string())
            }
            other => other,
        })?;

    tracing::info!(
        schedule_id = %created.schedule.id,
        slot_count = created.slots.len(),
        "Schedule published"
    );
    ScheduleView::try_from(&created)
}

/// ## Summary
/// Returns the schedule a technician published for `date`.
///
/// ## Errors
/// Returns `NotFound` if there is none.
pub async fn get(
    conn: &mut DbConnection<'_>,
    technician_id: uuid::Uuid,
    date: NaiveDate,
) -> ServiceResult<ScheduleView> {
    let row = schedule::find_with_slots(conn, technician_id, date)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Schedule".to_string()))?;
    ScheduleView::try_from(&row)
}

/// ## Errors
/// Returns `NotFound` if the schedule does not exist.
pub async fn get_by_id(
    conn: &mut DbConnection<'_>,
    schedule_id: uuid::Uuid,
) -> ServiceResult<ScheduleView> {
    let row = schedule::get_with_slots(conn, schedule_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Schedule".to_string()))?;
    ScheduleView::try_from(&row)
}

/// ## Summary
/// Lists a technician's schedules from `from` onward.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn list_for_technician(
    conn: &mut DbConnection<'_>,
    technician_id: uuid::Uuid,
    from: NaiveDate,
) -> ServiceResult<Vec<ScheduleView>> {
    schedule::list_for_technician(conn, technician_id, from)
        .await?
        .iter()
        .map(ScheduleView::try_from)
        .collect()
}

/// ## Summary
/// Hides a schedule from the slot finder and from new requests. Calling it
/// on an inactive schedule is a no-op.
///
/// ## Errors
/// - `NotFound` if the schedule does not exist
/// - `Forbidden` unless the actor owns it
#[tracing::instrument(skip(conn), fields(actor = %actor))]
pub async fn deactivate(
    conn: &mut DbConnection<'_>,
    actor: &Actor,
    schedule_id: uuid::Uuid,
) -> ServiceResult<ScheduleView> {
    let current = schedule::get(conn, schedule_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Schedule".to_string()))?;
    actor.require_owner(current.technician_id, "Schedule")?;

    if schedule::deactivate(conn, schedule_id).await? {
        tracing::info!("Schedule deactivated");
    }
    get_by_id(conn, schedule_id).await
}
