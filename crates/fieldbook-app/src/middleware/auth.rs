use salvo::Depot;
use salvo::http::StatusCode;
use salvo::writing::Json;

use crate::config::get_config_from_depot;
use crate::error::{AppError, AppResult};
use fieldbook_core::types::Role;
use fieldbook_service::identity::Actor;

pub mod depot_keys {
    pub const ACTOR: &str = "__actor";
}

/// Why identity headers could not be turned into an [`Actor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    InvalidUserId,
    MissingRole,
    InvalidRole,
}

/// ## Summary
/// Builds the caller identity from the gateway headers.
///
/// ## Returns
/// `Ok(None)` when no user header is present, i.e. an anonymous request.
///
/// ## Errors
/// Returns an `IdentityError` when the headers are present but unusable.
pub fn actor_from_headers(
    user: Option<&str>,
    role: Option<&str>,
) -> Result<Option<Actor>, IdentityError> {
    let Some(user) = user.map(str::trim).filter(|u| !u.is_empty()) else {
        return Ok(None);
    };
    let id = uuid::Uuid::parse_str(user).map_err(|_err| IdentityError::InvalidUserId)?;
    let role = role
        .ok_or(IdentityError::MissingRole)?
        .parse::<Role>()
        .map_err(|_err| IdentityError::InvalidRole)?;
    Ok(Some(Actor::new(id, role)))
}

/// ## Summary
/// Returns the caller identity stored by [`IdentityMiddleware`].
///
/// ## Errors
/// Returns `NotAuthenticated` for anonymous requests.
pub fn actor_from_depot(depot: &Depot) -> AppResult<Actor> {
    depot
        .get::<Actor>(depot_keys::ACTOR)
        .copied()
        .map_err(|_err| AppError::NotAuthenticated)
}

/// ## Summary
/// Identity middleware that trusts the upstream gateway's identity headers
/// and stores the resulting [`Actor`] in the depot.
///
/// Requests without the user header continue anonymously; handlers that need
/// a caller reject them with 401.
///
/// ## Errors
/// Returns HTTP 401 if the headers are present but malformed.
pub struct IdentityMiddleware;

#[salvo::async_trait]
impl salvo::Handler for IdentityMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        let config = match get_config_from_depot(depot) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!(error = ?e, "Failed to get config from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(ToOwned::to_owned)
        };
        let user = header(&config.auth.user_header);
        let role = header(&config.auth.role_header);

        match actor_from_headers(user.as_deref(), role.as_deref()) {
            Ok(Some(actor)) => {
                tracing::debug!(actor = %actor, "Identity established");
                depot.insert(depot_keys::ACTOR, actor);
            }
            Ok(None) => {
                tracing::trace!("Anonymous request");
            }
            Err(e) => {
                tracing::warn!(error = ?e, "Rejecting malformed identity headers");
                let err = AppError::NotAuthenticated;
                res.status_code(err.status());
                res.render(Json(err.response()));
                ctrl.skip_rest();
            }
        }
    }
}
