use salvo::async_trait;
use std::sync::Arc;

use crate::error::AppResult;
use fieldbook_core::error::CoreError;
use fieldbook_service::payment::PaymentIntentProvider;

/// Injects the payment-intent provider used by online settlement.
pub struct PaymentProviderHandler {
    pub provider: Arc<dyn PaymentIntentProvider>,
}

#[async_trait]
impl salvo::Handler for PaymentProviderHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
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
/// Retrieves the payment-intent provider from the depot.
///
/// ## Errors
/// Returns an error if no provider was injected.
pub fn get_payments_from_depot(depot: &salvo::Depot) -> AppResult<Arc<dyn PaymentIntentProvider>> {
    depot
        .obtain::<Arc<dyn PaymentIntentProvider>>()
        .cloned()
        .map_err(|_err| {
            CoreError::InvariantViolation("Payment provider not found in depot").into()
        })
}
