use salvo::{Depot, Router, handler};

use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;

/// Liveness: the process is up and routing.
#[handler]
async fn healthcheck() -> &'static str {
    "OK"
}

/// ## Summary
/// Readiness: a pooled connection can be checked out and validated.
///
/// ## Errors
/// Returns 503 when the database is unreachable.
#[handler]
async fn readiness(depot: &Depot) -> AppResult<&'static str> {
    let provider = get_db_from_depot(depot)?;
    drop(provider.get_connection().await?);
    Ok("READY")
}

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck))
        .push(Router::with_path("readiness").get(readiness))
}
