use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel_async::pooled_connection::bb8::RunError),

    #[error("Stored document is malformed: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    #[error(transparent)]
    CoreError(#[from] fieldbook_core::error::CoreError),
}

impl DbError {
    /// True for a unique-constraint violation, optionally on a specific constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        let Self::DatabaseError(err) = self else {
            return false;
        };
        is_unique_violation(err, constraint)
    }
}

/// ## Summary
/// Checks whether a diesel error is a unique violation, optionally on the
/// named constraint.
#[must_use]
pub fn is_unique_violation(err: &diesel::result::Error, constraint: Option<&str>) -> bool {
    use diesel::result::{DatabaseErrorKind, Error};

    match err {
        Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            constraint.is_none_or(|name| info.constraint_name() == Some(name))
        }
        _ => false,
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;
