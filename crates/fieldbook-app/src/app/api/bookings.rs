//! Booking lifecycle endpoints.

use chrono::Utc;
use fieldbook_core::types::BookingStatus;
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::Deserialize;

use fieldbook_service::lifecycle::{self, SettlePayment, Settlement, SubmitReview};
use fieldbook_service::view::{BookingView, ReviewView};

use super::{BOOKINGS_ROUTE_COMPONENT, json_body, uuid_param};
use crate::config::get_rules_from_depot;
use crate::db_handler::get_db_from_depot;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::actor_from_depot;
use crate::payments_handler::get_payments_from_depot;

#[derive(Debug, Deserialize)]
struct AttachReviewRequest {
    review_id: uuid::Uuid,
}

/// ## Summary
/// GET /api/bookings?status= - The caller's bookings
#[handler]
async fn list(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<BookingView>>> {
    let actor = actor_from_depot(depot)?;
    let status = req.query::<BookingStatus>("status");

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(Json(lifecycle::list_for_actor(&mut conn, &actor, status).await?))
}

/// ## Summary
/// GET /api/bookings/{id}
#[handler]
async fn get(req: &mut Request, depot: &mut Depot) -> AppResult<Json<BookingView>> {
    let actor = actor_from_depot(depot)?;
    let booking_id = uuid_param(req, "id")?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(Json(lifecycle::get(&mut conn, &actor, booking_id).await?))
}

/// ## Summary
/// POST /api/bookings/{id}/cancel
///
/// ## Errors
/// 422 with `cancellation_window_closed` inside the window.
#[handler]
async fn cancel(req: &mut Request, depot: &mut Depot) -> AppResult<Json<BookingView>> {
    let actor = actor_from_depot(depot)?;
    let rules = get_rules_from_depot(depot)?;
    let booking_id = uuid_param(req, "id")?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(Json(
        lifecycle::cancel(&mut conn, &actor, &rules, booking_id, Utc::now()).await?,
    ))
}

/// ## Summary
/// POST /api/bookings/{id}/payment - Record cash or start an online payment
///
/// ## Errors
/// 402 with `payment_failed` if the provider is unavailable; retryable.
#[handler]
async fn settle(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<Json<Settlement>> {
    let actor = actor_from_depot(depot)?;
    let rules = get_rules_from_depot(depot)?;
    let payments = get_payments_from_depot(depot)?;
    let booking_id = uuid_param(req, "id")?;
    let input: SettlePayment = json_body(req).await?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    let settlement = lifecycle::settle_payment(
        &mut conn,
        &actor,
        &rules,
        payments.as_ref(),
        booking_id,
        input,
    )
    .await?;

    res.status_code(StatusCode::CREATED);
    Ok(Json(settlement))
}

/// ## Summary
/// POST /api/bookings/{id}/review - The customer reviews a completed booking
#[handler]
async fn review(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<Json<ReviewView>> {
    let actor = actor_from_depot(depot)?;
    let booking_id = uuid_param(req, "id")?;
    let input: SubmitReview = json_body(req).await?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    let view = lifecycle::submit_review(&mut conn, &actor, booking_id, input).await?;

    res.status_code(StatusCode::CREATED);
    Ok(Json(view))
}

/// ## Summary
/// POST /api/bookings/{id}/review/attach - Link a review recorded by the
/// external review store (admin only)
#[handler]
async fn attach_review(req: &mut Request, depot: &mut Depot) -> AppResult<Json<BookingView>> {
    let actor = actor_from_depot(depot)?;
    if !actor.is_admin() {
        return Err(AppError::ServiceError(
            fieldbook_service::error::ServiceError::Forbidden(
                "only the review store may attach reviews".to_string(),
            ),
        ));
    }
    let booking_id = uuid_param(req, "id")?;
    let input: AttachReviewRequest = json_body(req).await?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(Json(
        lifecycle::attach_review(&mut conn, booking_id, input.review_id).await?,
    ))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(BOOKINGS_ROUTE_COMPONENT)
        .get(list)
        .push(
            Router::with_path("{id}")
                .get(get)
                .push(Router::with_path("cancel").post(cancel))
                .push(Router::with_path("payment").post(settle))
                .push(
                    Router::with_path("review")
                        .post(review)
                        .push(Router::with_path("attach").post(attach_review)),
                ),
        )
}
