//! Booking requests and their promotion.

use chrono::NaiveDate;
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};

use fieldbook_service::allocation::{self, Promotion};
use fieldbook_service::ledger::{self, SubmitRequest};
use fieldbook_service::view::RequestView;

use super::{REQUESTS_ROUTE_COMPONENT, json_body, uuid_param};
use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;
use crate::middleware::auth::actor_from_depot;

/// ## Summary
/// POST /api/requests - Ask a technician for a slot
///
/// ## Errors
/// 409 if the caller already requested this slot, 400 for invalid input.
#[handler]
async fn submit(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<Json<RequestView>> {
    let actor = actor_from_depot(depot)?;
    let input: SubmitRequest = json_body(req).await?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    let view = ledger::submit(&mut conn, &actor, input).await?;

    res.status_code(StatusCode::CREATED);
    Ok(Json(view))
}

/// ## Summary
/// GET /api/requests - The caller's own requests
#[handler]
async fn mine(depot: &mut Depot) -> AppResult<Json<Vec<RequestView>>> {
    let actor = actor_from_depot(depot)?;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(Json(ledger::requests_for_customer(&mut conn, &actor).await?))
}

/// ## Summary
/// GET /api/requests/pending?date= - Open requests for the calling technician
#[handler]
async fn pending(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<RequestView>>> {
    let actor = actor_from_depot(depot)?;
    let date = req.query::<NaiveDate>("date");

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(Json(
        ledger::pending_for_technician(&mut conn, &actor, date).await?,
    ))
}

/// ## Summary
/// POST /api/requests/{id}/accept - Promote a request into a booking
///
/// ## Errors
/// 409 with `slot_already_taken` if another request won the slot.
#[handler]
async fn accept(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<Json<Promotion>> {
    let actor = actor_from_depot(depot)?;
    let request_id = uuid_param(req, "id")?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    let promotion = allocation::promote(&mut conn, &actor, request_id).await?;

    res.status_code(StatusCode::CREATED);
    Ok(Json(promotion))
}

/// ## Summary
/// POST /api/requests/{id}/reject
#[handler]
async fn reject(req: &mut Request, depot: &mut Depot) -> AppResult<Json<RequestView>> {
    let actor = actor_from_depot(depot)?;
    let request_id = uuid_param(req, "id")?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(Json(allocation::reject(&mut conn, &actor, request_id).await?))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(REQUESTS_ROUTE_COMPONENT)
        .post(submit)
        .get(mine)
        .push(Router::with_path("pending").get(pending))
        .push(Router::with_path("{id}/accept").post(accept))
        .push(Router::with_path("{id}/reject").post(reject))
}
