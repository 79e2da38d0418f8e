use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

/// Technician profile as replicated from the profile service.
///
/// Only the fields the scheduling core needs: the service offered and
/// whether verification has completed.
#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::technician)]
#[diesel(check_for_backend(Pg))]
pub struct Technician {
    pub id: uuid::Uuid,
    pub service_id: uuid::Uuid,
    pub display_name: String,
    pub is_approved: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = schema::technician)]
pub struct NewTechnician<'a> {
    pub id: uuid::Uuid,
    pub service_id: uuid::Uuid,
    pub display_name: &'a str,
    pub is_approved: bool,
}
