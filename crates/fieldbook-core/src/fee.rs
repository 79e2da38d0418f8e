//! Platform fee arithmetic.

use crate::error::{CoreError, CoreResult};

/// Default platform cut, in percent.
pub const DEFAULT_SITE_FEE_PERCENT: u32 = 10;

/// ## Summary
/// Computes `ceil(amount * percent / 100)` in integer arithmetic.
///
/// ## Errors
/// Returns a validation error for non-positive amounts and an invariant
/// violation if the multiplication overflows.
pub fn site_fee(amount: i64, percent: u32) -> CoreResult<i64> {
    if amount <= 0 {
        return Err(CoreError::ValidationError(format!(
            "payment amount must be positive, got {amount}"
        )));
    }
    let scaled = amount
        .checked_mul(i64::from(percent))
        .ok_or(CoreError::InvariantViolation("site fee overflow"))?;
    Ok(scaled.div_euclid(100) + i64::from(scaled.rem_euclid(100) != 0))
}
