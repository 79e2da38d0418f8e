//! Query composition for `booking_request`.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::enums::RequestStatus;
use crate::db::schema::{booking_request, schedule};
use crate::model::request::{BookingRequest, NewBookingRequest};
use crate::model::schedule::Schedule;

/// Unique constraint enforcing one request per customer per slot.
pub const CUSTOMER_SLOT_KEY: &str = "booking_request_customer_slot_key";

/// ## Summary
/// Loads a request by ID.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn get(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> QueryResult<Option<BookingRequest>> {
    booking_request::table
        .filter(booking_request::id.eq(id))
        .select(BookingRequest::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Loads a request together with the schedule it targets.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn get_with_schedule(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> QueryResult<Option<(BookingRequest, Schedule)>> {
    booking_request::table
        .inner_join(schedule::table)
        .filter(booking_request::id.eq(id))
        .select((BookingRequest::as_select(), Schedule::as_select()))
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Checks whether the customer already holds a request for this slot, in any status.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn exists_for_customer(
    conn: &mut DbConnection<'_>,
    schedule_id: uuid::Uuid,
    customer_id: uuid::Uuid,
    time: DateTime<Utc>,
) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        booking_request::table
            .filter(booking_request::schedule_id.eq(schedule_id))
            .filter(booking_request::customer_id.eq(customer_id))
            .filter(booking_request::time.eq(time)),
    ))
    .get_result(conn)
    .await
}

/// ## Summary
/// Inserts a new request.
///
/// ## Errors
/// Returns an error if the database operation fails, including a unique
/// violation on [`CUSTOMER_SLOT_KEY`].
pub async fn insert(
    conn: &mut DbConnection<'_>,
    request: &NewBookingRequest<'_>,
) -> QueryResult<BookingRequest> {
    diesel::insert_into(booking_request::table)
        .values(request)
        .returning(BookingRequest::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Moves a request from `from` to `to` only if it is currently in `from`.
///
/// ## Returns
/// `true` if the request was updated.
///
/// ## Errors
/// Returns an error if the database operation fails.
#[tracing::instrument(skip(conn))]
pub async fn transition(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    from: RequestStatus,
    to: RequestStatus,
) -> QueryResult<bool> {
    let updated = diesel::update(
        booking_request::table
            .filter(booking_request::id.eq(id))
            .filter(booking_request::status.eq(from)),
    )
    .set((
        booking_request::status.eq(to),
        booking_request::updated_at.eq(Utc::now()),
    ))
    .execute(conn)
    .await?;
    Ok(updated == 1)
}

/// ## Summary
/// Cancels every other pending request for the same slot.
///
/// ## Returns
/// The requests that were cancelled, so their customers can be notified.
///
/// ## Errors
/// Returns an error if the database operation fails.
#[tracing::instrument(skip(conn))]
pub async fn cancel_pending_siblings(
    conn: &mut DbConnection<'_>,
    schedule_id: uuid::Uuid,
    time: DateTime<Utc>,
    except: uuid::Uuid,
) -> QueryResult<Vec<BookingRequest>> {
    diesel::update(
        booking_request::table
            .filter(booking_request::schedule_id.eq(schedule_id))
            .filter(booking_request::time.eq(time))
            .filter(booking_request::id.ne(except))
            .filter(booking_request::status.eq(RequestStatus::Pending)),
    )
    .set((
        booking_request::status.eq(RequestStatus::Cancelled),
        booking_request::updated_at.eq(Utc::now()),
    ))
    .returning(BookingRequest::as_returning())
    .get_results(conn)
    .await
}

/// ## Summary
/// Lists requests against a technician's schedules, optionally for one date,
/// ordered by slot time then submission order.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn for_technician(
    conn: &mut DbConnection<'_>,
    technician_id: uuid::Uuid,
    date: Option<NaiveDate>,
) -> QueryResult<Vec<BookingRequest>> {
    let mut query = booking_request::table
        .inner_join(schedule::table)
        .filter(schedule::technician_id.eq(technician_id))
        .into_boxed();

    if let Some(date) = date {
        query = query.filter(schedule::date.eq(date));
    }

    query
        .order((
            booking_request::time.asc(),
            booking_request::created_at.asc(),
        ))
        .select(BookingRequest::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Lists a customer's requests, newest first.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn for_customer(
    conn: &mut DbConnection<'_>,
    customer_id: uuid::Uuid,
) -> QueryResult<Vec<BookingRequest>> {
    booking_request::table
        .filter(booking_request::customer_id.eq(customer_id))
        .order(booking_request::created_at.desc())
        .select(BookingRequest::as_select())
        .load(conn)
        .await
}
