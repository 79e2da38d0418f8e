//! Query composition for `review`, plus the rating aggregate used by the finder.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use fieldbook_core::ranking::RatingSummary;

use crate::db::connection::DbConnection;
use crate::db::schema::review;
use crate::model::review::{NewReview, Review};

/// Unique constraint allowing one review per booking.
pub const BOOKING_KEY: &str = "review_booking_id_key";

/// ## Summary
/// Inserts a review.
///
/// ## Errors
/// Returns an error if the database operation fails, including a unique
/// violation on [`BOOKING_KEY`].
pub async fn insert(
    conn: &mut DbConnection<'_>,
    new_review: &NewReview<'_>,
) -> QueryResult<Review> {
    diesel::insert_into(review::table)
        .values(new_review)
        .returning(Review::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Loads a review by ID.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn get(conn: &mut DbConnection<'_>, id: uuid::Uuid) -> QueryResult<Option<Review>> {
    review::table
        .filter(review::id.eq(id))
        .select(Review::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Aggregates rating totals for each technician in `technician_ids`.
///
/// Technicians without reviews are absent from the result.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn rating_summaries(
    conn: &mut DbConnection<'_>,
    technician_ids: &[uuid::Uuid],
) -> QueryResult<Vec<(uuid::Uuid, RatingSummary)>> {
    if technician_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = review::table
        .filter(review::technician_id.eq_any(technician_ids))
        .group_by(review::technician_id)
        .select((
            review::technician_id,
            diesel::dsl::count(review::id),
            diesel::dsl::sum(review::rating),
        ))
        .load::<(uuid::Uuid, i64, Option<i64>)>(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(technician_id, count, total)| {
            (
                technician_id,
                RatingSummary {
                    total: total.unwrap_or(0),
                    count,
                },
            )
        })
        .collect())
}
