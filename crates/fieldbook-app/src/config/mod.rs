use std::sync::Arc;

use salvo::async_trait;
pub use fieldbook_core::config::*;
use fieldbook_service::rules::BookingRules;

use crate::error::{AppError, AppResult};

/// Injects the settings and the business rules derived from them.
pub struct ConfigHandler {
    pub settings: Arc<Settings>,
    pub rules: Arc<BookingRules>,
}

#[async_trait]
impl salvo::Handler for ConfigHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.settings));
        depot.inject(Arc::clone(&self.rules));
    }
}

/// ## Summary
/// Retrieves the application configuration from the depot.
///
/// ## Errors
/// Returns an error if the configuration is not found in the depot.
pub fn get_config_from_depot(depot: &salvo::Depot) -> AppResult<Arc<Settings>> {
    depot.obtain::<Arc<Settings>>().cloned().map_err(|_err| {
        AppError::CoreError(fieldbook_core::error::CoreError::InvariantViolation(
            "Configuration not found in depot",
        ))
    })
}

/// ## Summary
/// Retrieves the booking rules from the depot.
///
/// ## Errors
/// Returns an error if the rules are not found in the depot.
pub fn get_rules_from_depot(depot: &salvo::Depot) -> AppResult<Arc<BookingRules>> {
    depot.obtain::<Arc<BookingRules>>().cloned().map_err(|_err| {
        AppError::CoreError(fieldbook_core::error::CoreError::InvariantViolation(
            "Booking rules not found in depot",
        ))
    })
}
