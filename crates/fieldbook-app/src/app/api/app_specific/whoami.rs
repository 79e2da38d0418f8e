use salvo::prelude::Json;
use salvo::{Depot, Router, handler};

use fieldbook_service::identity::Actor;

use crate::error::AppResult;
use crate::middleware::auth::actor_from_depot;

/// ## Summary
/// Returns the caller identity established by the `IdentityMiddleware`.
///
/// ## Errors
/// Returns HTTP 401 for anonymous requests.
#[handler]
async fn whoami(depot: &Depot) -> AppResult<Json<Actor>> {
    Ok(Json(actor_from_depot(depot)?))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("whoami").get(whoami)
}
