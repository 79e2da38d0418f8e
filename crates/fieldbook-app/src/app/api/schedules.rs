//! Schedule publication and lookup.

use chrono::{NaiveDate, Utc};
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};

use fieldbook_service::availability::{self, PublishSchedule};
use fieldbook_service::view::ScheduleView;

use super::{SCHEDULES_ROUTE_COMPONENT, json_body, uuid_param};
use crate::config::get_rules_from_depot;
use crate::db_handler::get_db_from_depot;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::actor_from_depot;

/// ## Summary
/// POST /api/schedules - Publish the caller's availability for a date
///
/// ## Errors
/// 403 for non-technicians or unverified technicians, 409 if the date is
/// already published, 400 for invalid input.
#[handler]
async fn publish(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<Json<ScheduleView>> {
    let actor = actor_from_depot(depot)?;
    let rules = get_rules_from_depot(depot)?;
    let input: PublishSchedule = json_body(req).await?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    let view = availability::publish(&mut conn, &actor, &rules, &input, Utc::now()).await?;

    res.status_code(StatusCode::CREATED);
    Ok(Json(view))
}

/// ## Summary
/// GET /api/schedules?technician_id=&from= - List a technician's schedules
/// from a date (default: today)
///
/// ## Errors
/// 400 without a technician id.
#[handler]
async fn list(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<ScheduleView>>> {
    let rules = get_rules_from_depot(depot)?;
    let technician_id = match req.query::<uuid::Uuid>("technician_id") {
        Some(id) => id,
        None => actor_from_depot(depot)?.id,
    };
    let from = req
        .query::<NaiveDate>("from")
        .unwrap_or_else(|| rules.catalog.local_date(Utc::now()));

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(Json(
        availability::list_for_technician(&mut conn, technician_id, from).await?,
    ))
}

/// ## Summary
/// GET /api/schedules/{technician_id}/{date}
///
/// ## Errors
/// 404 if nothing was published for that date.
#[handler]
async fn get(req: &mut Request, depot: &mut Depot) -> AppResult<Json<ScheduleView>> {
    let technician_id = uuid_param(req, "technician_id")?;
    let date = req
        .param::<String>("date")
        .and_then(|raw| raw.parse::<NaiveDate>().ok())
        .ok_or_else(|| AppError::BadRequest("date must be YYYY-MM-DD".to_string()))?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(Json(availability::get(&mut conn, technician_id, date).await?))
}

/// ## Summary
/// POST /api/schedules/{id}/deactivate
///
/// ## Errors
/// 404 for an unknown schedule, 403 unless the caller owns it.
#[handler]
async fn deactivate(req: &mut Request, depot: &mut Depot) -> AppResult<Json<ScheduleView>> {
    let actor = actor_from_depot(depot)?;
    let schedule_id = uuid_param(req, "id")?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(Json(
        availability::deactivate(&mut conn, &actor, schedule_id).await?,
    ))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(SCHEDULES_ROUTE_COMPONENT)
        .post(publish)
        .get(list)
        .push(Router::with_path("{id}/deactivate").post(deactivate))
        .push(Router::with_path("{technician_id}/{date}").get(get))
}
