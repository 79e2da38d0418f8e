//! Query composition for `booking`.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::enums::BookingStatus;
use crate::db::schema::booking;
use crate::model::booking::{Booking, NewBooking};

/// ## Summary
/// Loads a booking by ID.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn get(conn: &mut DbConnection<'_>, id: uuid::Uuid) -> QueryResult<Option<Booking>> {
    booking::table
        .filter(booking::id.eq(id))
        .select(Booking::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts a booking created by promotion.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    new_booking: &NewBooking<'_>,
) -> QueryResult<Booking> {
    diesel::insert_into(booking::table)
        .values(new_booking)
        .returning(Booking::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Returns a query selecting a customer's bookings by appointment time.
#[must_use]
pub fn by_customer(customer_id: uuid::Uuid) -> booking::BoxedQuery<'static, diesel::pg::Pg> {
    booking::table
        .filter(booking::customer_id.eq(customer_id))
        .order(booking::time.asc())
        .into_boxed()
}

/// ## Summary
/// Returns a query selecting a technician's bookings by appointment time.
#[must_use]
pub fn by_technician(technician_id: uuid::Uuid) -> booking::BoxedQuery<'static, diesel::pg::Pg> {
    booking::table
        .filter(booking::technician_id.eq(technician_id))
        .order(booking::time.asc())
        .into_boxed()
}

/// ## Summary
/// Loads the bookings selected by `query`, optionally narrowed to one status.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn load_filtered(
    conn: &mut DbConnection<'_>,
    query: booking::BoxedQuery<'static, diesel::pg::Pg>,
    status: Option<BookingStatus>,
) -> QueryResult<Vec<Booking>> {
    let query = match status {
        Some(status) => query.filter(booking::status.eq(status)),
        None => query,
    };

    query.select(Booking::as_select()).load(conn).await
}

/// ## Summary
/// Moves a booking from `from` to `to` only if it is currently in `from`.
///
/// ## Returns
/// The updated booking, or `None` if the status did not match.
///
/// ## Errors
/// Returns an error if the database operation fails.
#[tracing::instrument(skip(conn))]
pub async fn transition(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    from: BookingStatus,
    to: BookingStatus,
) -> QueryResult<Option<Booking>> {
    diesel::update(
        booking::table
            .filter(booking::id.eq(id))
            .filter(booking::status.eq(from)),
    )
    .set((booking::status.eq(to), booking::updated_at.eq(Utc::now())))
    .returning(Booking::as_returning())
    .get_result(conn)
    .await
    .optional()
}

/// ## Summary
/// Links a payment to a confirmed booking that has none yet, optionally
/// completing the booking in the same statement.
///
/// ## Returns
/// The updated booking, or `None` if the booking was not confirmed or was
/// already paid.
///
/// ## Errors
/// Returns an error if the database operation fails.
#[tracing::instrument(skip(conn))]
pub async fn link_payment(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    payment_id: uuid::Uuid,
    complete: bool,
) -> QueryResult<Option<Booking>> {
    let status = if complete {
        BookingStatus::Completed
    } else {
        BookingStatus::Confirmed
    };

    diesel::update(
        booking::table
            .filter(booking::id.eq(id))
            .filter(booking::status.eq(BookingStatus::Confirmed))
            .filter(booking::payment_id.is_null()),
    )
    .set((
        booking::payment_id.eq(Some(payment_id)),
        booking::status.eq(status),
        booking::updated_at.eq(Utc::now()),
    ))
    .returning(Booking::as_returning())
    .get_result(conn)
    .await
    .optional()
}

/// ## Summary
/// Attaches a review reference if the booking has none.
///
/// ## Returns
/// `true` if the reference was written; `false` if one was already present
/// or the booking does not exist.
///
/// ## Errors
/// Returns an error if the database operation fails.
#[tracing::instrument(skip(conn))]
pub async fn attach_review(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    review_id: uuid::Uuid,
) -> QueryResult<bool> {
    let updated = diesel::update(
        booking::table
            .filter(booking::id.eq(id))
            .filter(booking::review_id.is_null()),
    )
    .set((
        booking::review_id.eq(Some(review_id)),
        booking::updated_at.eq(Utc::now()),
    ))
    .execute(conn)
    .await?;
    Ok(updated == 1)
}
