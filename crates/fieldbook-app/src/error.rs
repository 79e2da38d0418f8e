use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Writer, async_trait};
use serde::Serialize;
use thiserror::Error;

use fieldbook_service::error::ServiceError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] fieldbook_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] fieldbook_core::error::CoreError),

    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// ## Summary
/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl AppError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ServiceError(err) => service_status(err),
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::DatabaseError(fieldbook_db::error::DbError::PoolError(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::DatabaseError(_) | Self::CoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn response(&self) -> ErrorResponse {
        match self {
            Self::ServiceError(err) => ErrorResponse {
                error: err.code(),
                message: err.public_message(),
                retryable: err.is_retryable(),
            },
            Self::NotAuthenticated => ErrorResponse {
                error: "not_authenticated",
                message: self.to_string(),
                retryable: false,
            },
            Self::BadRequest(msg) => ErrorResponse {
                error: "bad_request",
                message: msg.clone(),
                retryable: false,
            },
            Self::DatabaseError(_) | Self::CoreError(_) => ErrorResponse {
                error: "storage_error",
                message: "Something went wrong, please retry".to_string(),
                retryable: true,
            },
        }
    }
}

const fn service_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::AlreadyExists(_)
        | ServiceError::DuplicateRequest
        | ServiceError::SlotAlreadyTaken
        | ServiceError::ReviewAlreadyExists
        | ServiceError::InvalidTransition { .. } => StatusCode::CONFLICT,
        ServiceError::CancellationWindowClosed => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::PaymentFailed(_) => StatusCode::PAYMENT_REQUIRED,
        ServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotApproved | ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ServiceError::InvalidConfiguration(_)
        | ServiceError::InvariantViolation(_)
        | ServiceError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[async_trait]
impl Writer for AppError {
    async fn write(self, _req: &mut Request, _depot: &mut Depot, res: &mut Response) {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        res.status_code(status);
        res.render(Json(self.response()));
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
