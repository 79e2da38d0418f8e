//! Queries for replicated technician profiles.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::technician;
use crate::model::technician::{NewTechnician, Technician};

/// ## Summary
/// Returns a query to find a technician by ID.
#[must_use]
pub fn by_id(id: uuid::Uuid) -> technician::BoxedQuery<'static, diesel::pg::Pg> {
    technician::table.filter(technician::id.eq(id)).into_boxed()
}

/// ## Summary
/// Loads a technician profile.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn get(conn: &mut DbConnection<'_>, id: uuid::Uuid) -> QueryResult<Option<Technician>> {
    by_id(id)
        .select(Technician::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts or refreshes a technician profile pushed by the profile service.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn upsert(
    conn: &mut DbConnection<'_>,
    profile: &NewTechnician<'_>,
) -> QueryResult<Technician> {
    diesel::insert_into(technician::table)
        .values(profile)
        .on_conflict(technician::id)
        .do_update()
        .set((
            profile,
            technician::updated_at.eq(chrono::Utc::now()),
        ))
        .returning(Technician::as_returning())
        .get_result(conn)
        .await
}
