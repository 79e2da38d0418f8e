use diesel::{pg::Pg, prelude::*};
use serde_json::Value as JsonValue;

use crate::db::{enums::RequestStatus, schema};

/// A customer's request for a specific technician and time.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = schema::booking_request)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(super::schedule::Schedule, foreign_key = schedule_id))]
pub struct BookingRequest {
    pub id: uuid::Uuid,
    pub schedule_id: uuid::Uuid,
    pub customer_id: uuid::Uuid,
    pub time: chrono::DateTime<chrono::Utc>,
    pub address: JsonValue,
    pub description: String,
    pub status: RequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::booking_request)]
pub struct NewBookingRequest<'a> {
    pub id: uuid::Uuid,
    pub schedule_id: uuid::Uuid,
    pub customer_id: uuid::Uuid,
    pub time: chrono::DateTime<chrono::Utc>,
    pub address: JsonValue,
    pub description: &'a str,
    pub status: RequestStatus,
}

impl fieldbook_core::pending::RequestLike for BookingRequest {
    fn schedule_id(&self) -> uuid::Uuid {
        self.schedule_id
    }

    fn time(&self) -> chrono::DateTime<chrono::Utc> {
        self.time
    }

    fn status(&self) -> fieldbook_core::types::RequestStatus {
        self.status.into()
    }
}
