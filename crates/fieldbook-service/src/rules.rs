//! Business rules resolved from configuration once at start-up.

use fieldbook_core::catalog::SlotCatalog;
use fieldbook_core::config::Settings;
use fieldbook_core::fee::DEFAULT_SITE_FEE_PERCENT;
use fieldbook_core::policy::CancellationPolicy;

use crate::error::ServiceResult;

/// Everything the services need to know about marketplace policy.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRules {
    pub catalog: SlotCatalog,
    pub cancellation: CancellationPolicy,
    pub site_fee_percent: u32,
    pub currency: String,
    pub release_slot_on_cancel: bool,
    pub search_radius_km: f64,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            catalog: SlotCatalog::default(),
            cancellation: CancellationPolicy::default(),
            site_fee_percent: DEFAULT_SITE_FEE_PERCENT,
            currency: "usd".to_string(),
            release_slot_on_cancel: false,
            search_radius_km: 10.0,
        }
    }
}

impl BookingRules {
    /// ## Errors
    /// Returns `InvalidConfiguration` if the slot catalog cannot be built.
    pub fn from_settings(settings: &Settings) -> ServiceResult<Self> {
        Ok(Self {
            catalog: settings.scheduling.catalog()?,
            cancellation: settings.booking.cancellation_policy(),
            site_fee_percent: settings.booking.site_fee_percent,
            currency: settings.booking.currency.clone(),
            release_slot_on_cancel: settings.booking.release_slot_on_cancel,
            search_radius_km: settings.scheduling.search_radius_km,
        })
    }
}
