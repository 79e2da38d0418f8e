//! Replicated technician profiles.
//!
//! The profile service owns verification; it pushes the fields scheduling
//! depends on through [`sync`].

use fieldbook_core::types::Role;
use fieldbook_db::db::connection::DbConnection;
use fieldbook_db::db::query::technician;
use fieldbook_db::model::technician::{NewTechnician, Technician};
use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};
use crate::identity::Actor;

#[derive(Debug, Clone, Deserialize)]
pub struct TechnicianProfile {
    pub service_id: uuid::Uuid,
    pub display_name: String,
    #[serde(default)]
    pub is_approved: bool,
}

/// ## Summary
/// Inserts or refreshes the replicated profile of `technician_id`.
///
/// ## Errors
/// - `Forbidden` unless the actor is an admin
/// - `ValidationError` for a blank display name
#[tracing::instrument(skip(conn, profile), fields(actor = %actor, approved = profile.is_approved))]
pub async fn sync(
    conn: &mut DbConnection<'_>,
    actor: &Actor,
    technician_id: uuid::Uuid,
    profile: &TechnicianProfile,
) -> ServiceResult<Technician> {
    actor.require_role(Role::Admin)?;
    let display_name = profile.display_name.trim();
    if display_name.is_empty() {
        return Err(ServiceError::ValidationError(
            "display_name is required".to_string(),
        ));
    }

    let row = technician::upsert(
        conn,
        &NewTechnician {
            id: technician_id,
            service_id: profile.service_id,
            display_name,
            is_approved: profile.is_approved,
        },
    )
    .await?;

    tracing::info!("Technician profile synced");
    Ok(row)
}

/// ## Errors
/// Returns `NotFound` if no profile has been replicated for `technician_id`.
pub async fn get(
    conn: &mut DbConnection<'_>,
    technician_id: uuid::Uuid,
) -> ServiceResult<Technician> {
    technician::get(conn, technician_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Technician".to_string()))
}
