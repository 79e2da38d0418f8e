//! Query composition for `payment`.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::enums::PaymentStatus;
use crate::db::schema::payment;
use crate::model::payment::{NewPayment, Payment};

/// ## Summary
/// Loads a payment by ID.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn get(conn: &mut DbConnection<'_>, id: uuid::Uuid) -> QueryResult<Option<Payment>> {
    payment::table
        .filter(payment::id.eq(id))
        .select(Payment::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts a payment record.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    new_payment: &NewPayment<'_>,
) -> QueryResult<Payment> {
    diesel::insert_into(payment::table)
        .values(new_payment)
        .returning(Payment::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Completes a pending payment and records the site fee.
///
/// ## Returns
/// The completed payment, or `None` if it was not pending.
///
/// ## Errors
/// Returns an error if the database operation fails.
#[tracing::instrument(skip(conn))]
pub async fn complete(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    site_fee: i64,
    completed_at: DateTime<Utc>,
) -> QueryResult<Option<Payment>> {
    diesel::update(
        payment::table
            .filter(payment::id.eq(id))
            .filter(payment::status.eq(PaymentStatus::Pending)),
    )
    .set((
        payment::status.eq(PaymentStatus::Completed),
        payment::site_fee.eq(Some(site_fee)),
        payment::completed_at.eq(Some(completed_at)),
    ))
    .returning(Payment::as_returning())
    .get_result(conn)
    .await
    .optional()
}
