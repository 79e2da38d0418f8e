//! Replicated technician profiles, pushed by the profile service.

use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};

use fieldbook_db::model::technician::Technician;
use fieldbook_service::profile::{self, TechnicianProfile};

use super::{TECHNICIANS_ROUTE_COMPONENT, json_body, uuid_param};
use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;
use crate::middleware::auth::actor_from_depot;

/// ## Summary
/// PUT /api/technicians/{id} - Insert or refresh a profile (admin only)
#[handler]
async fn sync(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Technician>> {
    let actor = actor_from_depot(depot)?;
    let technician_id = uuid_param(req, "id")?;
    let input: TechnicianProfile = json_body(req).await?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(Json(
        profile::sync(&mut conn, &actor, technician_id, &input).await?,
    ))
}

/// ## Summary
/// GET /api/technicians/{id}
#[handler]
async fn get(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Technician>> {
    let technician_id = uuid_param(req, "id")?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(Json(profile::get(&mut conn, technician_id).await?))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(TECHNICIANS_ROUTE_COMPONENT)
        .push(Router::with_path("{id}").get(get).put(sync))
}
