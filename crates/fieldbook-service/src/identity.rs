//! Caller identity as established by the upstream gateway.

use std::fmt;

use fieldbook_core::types::Role;
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: uuid::Uuid,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub const fn new(id: uuid::Uuid, role: Role) -> Self {
        Self { id, role }
    }

    #[must_use]
    pub const fn customer(id: uuid::Uuid) -> Self {
        Self::new(id, Role::Customer)
    }

    #[must_use]
    pub const fn technician(id: uuid::Uuid) -> Self {
        Self::new(id, Role::Technician)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// ## Errors
    /// Returns `Forbidden` unless the actor has `role`.
    pub fn require_role(&self, role: Role) -> ServiceResult<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "this operation requires the {role} role"
            )))
        }
    }

    /// ## Summary
    /// Requires the actor to be `owner_id`, or an admin.
    ///
    /// ## Errors
    /// Returns `Forbidden` otherwise.
    pub fn require_owner(&self, owner_id: uuid::Uuid, what: &str) -> ServiceResult<()> {
        if self.id == owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!("{what} belongs to someone else")))
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role, self.id)
    }
}
