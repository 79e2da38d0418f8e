use salvo::async_trait;
use std::sync::Arc;

use crate::error::AppResult;
use fieldbook_core::error::CoreError;
use fieldbook_db::db::DbProvider;

/// Shares one connection source with every request. The provider is wrapped
/// once at start-up so each request only bumps a reference count.
pub struct DbProviderHandler {
    provider: Arc<dyn DbProvider>,
}

impl DbProviderHandler {
    #[must_use]
    pub fn new(provider: impl DbProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}

#[async_trait]
impl salvo::Handler for DbProviderHandler {
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.provider));
    }
}

/// ## Summary
/// Retrieves the booking database from the depot.
///
/// ## Errors
/// Returns an invariant violation if the router was built without a
/// [`DbProviderHandler`].
pub fn get_db_from_depot(depot: &salvo::Depot) -> AppResult<Arc<dyn DbProvider>> {
    depot
        .obtain::<Arc<dyn DbProvider>>()
        .cloned()
        .map_err(|_err| {
            CoreError::InvariantViolation("Database provider not found in depot").into()
        })
}
