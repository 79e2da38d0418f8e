//! Slot search.

use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};

use fieldbook_service::finder::{self, FindSlots, SlotCandidate};

use super::SLOTS_ROUTE_COMPONENT;
use crate::config::get_rules_from_depot;
use crate::db_handler::get_db_from_depot;
use crate::error::{AppError, AppResult};

/// ## Summary
/// GET /api/slots?service_id&latitude&longitude&date&time - Technicians near a
/// point with the slot at `time` free, nearest and best rated first
///
/// ## Errors
/// 400 for missing or malformed query parameters.
#[handler]
async fn find(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<SlotCandidate>>> {
    let rules = get_rules_from_depot(depot)?;
    let query: FindSlots = req
        .parse_queries()
        .map_err(|e| AppError::BadRequest(format!("invalid search: {e}")))?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(Json(finder::find(&mut conn, &rules, query).await?))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(SLOTS_ROUTE_COMPONENT).get(find)
}
