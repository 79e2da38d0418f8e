use diesel::{pg::Pg, prelude::*};
use serde_json::Value as JsonValue;

use crate::db::{enums::BookingStatus, schema};

/// A confirmed appointment. Created only by promoting a request.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::booking)]
#[diesel(check_for_backend(Pg))]
pub struct Booking {
    pub id: uuid::Uuid,
    pub request_id: uuid::Uuid,
    pub customer_id: uuid::Uuid,
    pub technician_id: uuid::Uuid,
    pub service_id: uuid::Uuid,
    /// Address snapshot taken from the request at promotion time.
    pub customer_address: JsonValue,
    pub time: chrono::DateTime<chrono::Utc>,
    pub date: chrono::NaiveDate,
    pub status: BookingStatus,
    pub description: String,
    pub payment_id: Option<uuid::Uuid>,
    pub review_id: Option<uuid::Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Booking {
    /// The other participant of the booking, if `actor_id` is one of them.
    #[must_use]
    pub fn counterparty_of(&self, actor_id: uuid::Uuid) -> Option<uuid::Uuid> {
        if actor_id == self.customer_id {
            Some(self.technician_id)
        } else if actor_id == self.technician_id {
            Some(self.customer_id)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_participant(&self, actor_id: uuid::Uuid) -> bool {
        self.counterparty_of(actor_id).is_some()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::booking)]
pub struct NewBooking<'a> {
    pub id: uuid::Uuid,
    pub request_id: uuid::Uuid,
    pub customer_id: uuid::Uuid,
    pub technician_id: uuid::Uuid,
    pub service_id: uuid::Uuid,
    pub customer_address: JsonValue,
    pub time: chrono::DateTime<chrono::Utc>,
    pub date: chrono::NaiveDate,
    pub status: BookingStatus,
    pub description: &'a str,
}
