//! Online payment confirmation.

use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};

use fieldbook_service::lifecycle::{self, Settlement};

use super::{PAYMENTS_ROUTE_COMPONENT, uuid_param};
use crate::config::get_rules_from_depot;
use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;
use crate::middleware::auth::actor_from_depot;

/// ## Summary
/// POST /api/payments/{id}/confirm - Complete a pending online payment once
/// the provider reports success. Repeating the call is harmless.
#[handler]
async fn confirm(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Settlement>> {
    let actor = actor_from_depot(depot)?;
    let rules = get_rules_from_depot(depot)?;
    let payment_id = uuid_param(req, "id")?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(Json(
        lifecycle::confirm_online_payment(&mut conn, &actor, &rules, payment_id).await?,
    ))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(PAYMENTS_ROUTE_COMPONENT)
        .push(Router::with_path("{id}/confirm").post(confirm))
}
