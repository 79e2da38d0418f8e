mod app_specific;
mod bookings;
mod payments;
mod requests;
mod schedules;
mod slots;
mod technicians;

use salvo::Request;
use salvo::Router;
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::IdentityMiddleware;

// Re-export route constants from core
pub use fieldbook_core::constants::{
    API_ROUTE_COMPONENT, API_ROUTE_PREFIX, BOOKINGS_ROUTE_COMPONENT, PAYMENTS_ROUTE_COMPONENT,
    REQUESTS_ROUTE_COMPONENT, SCHEDULES_ROUTE_COMPONENT, SLOTS_ROUTE_COMPONENT,
    TECHNICIANS_ROUTE_COMPONENT,
};

/// ## Summary
/// Constructs the main API router.
///
/// ## Errors
/// Returns an error if any child route handler fails to initialize.
pub fn routes() -> anyhow::Result<Router> {
    Ok(Router::with_path(API_ROUTE_COMPONENT)
        .hoop(IdentityMiddleware)
        .push(app_specific::routes())
        .push(schedules::routes())
        .push(slots::routes())
        .push(requests::routes())
        .push(bookings::routes())
        .push(payments::routes())
        .push(technicians::routes()))
}

/// Reads a UUID path parameter.
fn uuid_param(req: &Request, name: &str) -> AppResult<uuid::Uuid> {
    let Some(raw) = req.param::<String>(name) else {
        return Err(AppError::BadRequest(format!("{name} is required")));
    };
    uuid::Uuid::parse_str(&raw)
        .map_err(|_err| AppError::BadRequest(format!("{name} is not a valid id")))
}

/// Parses the JSON body, mapping failures to 400.
async fn json_body<T: DeserializeOwned>(req: &mut Request) -> AppResult<T> {
    req.parse_json::<T>().await.map_err(|e| {
        tracing::debug!(error = %e, "Failed to parse request body");
        AppError::BadRequest(format!("invalid request body: {e}"))
    })
}
