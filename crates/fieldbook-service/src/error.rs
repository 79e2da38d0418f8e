use fieldbook_core::error::CoreError;
use fieldbook_db::error::DbError;
use thiserror::Error;

/// Service layer errors
///
/// Business outcomes are ordinary variants; only `StorageError` and
/// `PaymentFailed` are worth retrying.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Duplicate request for this slot")]
    DuplicateRequest,

    #[error("Slot already taken")]
    SlotAlreadyTaken,

    #[error("Cancellation window closed")]
    CancellationWindowClosed,

    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    #[error("Review already exists")]
    ReviewAlreadyExists,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Technician is not approved")]
    NotApproved,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),

    #[error("Storage error: {0}")]
    StorageError(#[from] DbError),
}

impl ServiceError {
    /// True when repeating the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageError(_) | Self::PaymentFailed(_))
    }

    /// Stable machine-readable code for API responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::DuplicateRequest => "duplicate_request",
            Self::SlotAlreadyTaken => "slot_already_taken",
            Self::CancellationWindowClosed => "cancellation_window_closed",
            Self::PaymentFailed(_) => "payment_failed",
            Self::ReviewAlreadyExists => "review_already_exists",
            Self::ValidationError(_) => "validation_error",
            Self::NotApproved => "not_approved",
            Self::Forbidden(_) => "forbidden",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::InvalidConfiguration(_)
            | Self::InvariantViolation(_)
            | Self::StorageError(_) => "storage_error",
        }
    }

    /// ## Summary
    /// Message safe to show to a caller. Internal failures are reduced to a
    /// generic sentence.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound(what) => format!("{what} not found"),
            Self::AlreadyExists(what) => format!("{what} already exists"),
            Self::DuplicateRequest => "You have already requested this slot".to_string(),
            Self::SlotAlreadyTaken => "Someone else has already booked this slot".to_string(),
            Self::CancellationWindowClosed => {
                "Bookings can no longer be cancelled this close to the appointment".to_string()
            }
            Self::PaymentFailed(_) => "Payment could not be processed, please retry".to_string(),
            Self::ReviewAlreadyExists => "This booking has already been reviewed".to_string(),
            Self::ValidationError(msg) => msg.clone(),
            Self::NotApproved => "Technician verification is not complete".to_string(),
            Self::Forbidden(msg) => msg.clone(),
            Self::InvalidTransition { from, to } => {
                format!("Cannot change status from {from} to {to}")
            }
            Self::InvalidConfiguration(_) | Self::InvariantViolation(_) | Self::StorageError(_) => {
                "Something went wrong, please retry".to_string()
            }
        }
    }
}

impl From<diesel::result::Error> for ServiceError {
    fn from(err: diesel::result::Error) -> Self {
        Self::StorageError(DbError::DatabaseError(err))
    }
}

impl From<diesel_async::pooled_connection::bb8::RunError> for ServiceError {
    fn from(err: diesel_async::pooled_connection::bb8::RunError) -> Self {
        Self::StorageError(DbError::PoolError(err))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::StorageError(DbError::MalformedDocument(err))
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(msg) | CoreError::InvalidInput(msg) => {
                Self::ValidationError(msg)
            }
            CoreError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            CoreError::ConfigError(msg) => Self::InvalidConfiguration(msg),
            CoreError::InvariantViolation(msg) => Self::InvariantViolation(msg),
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
