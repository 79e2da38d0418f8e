//! Caller-facing projections of stored rows.
//!
//! Rows keep addresses as JSON documents and statuses as database enums;
//! views carry the typed core values instead.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use fieldbook_core::geo::GeoPoint;
use fieldbook_core::types::{
    Address, BookingStatus, PaymentMode, PaymentStatus, RequestStatus, SlotStatus,
};
use fieldbook_db::model::booking::Booking;
use fieldbook_db::model::payment::Payment;
use fieldbook_db::model::request::BookingRequest;
use fieldbook_db::model::review::Review;
use fieldbook_db::model::schedule::{ScheduleSlot, ScheduleWithSlots};

use crate::error::{ServiceError, ServiceResult};

fn address_of(document: &serde_json::Value) -> ServiceResult<Address> {
    Ok(serde_json::from_value(document.clone())?)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotView {
    pub time: DateTime<Utc>,
    pub status: SlotStatus,
}

impl From<&ScheduleSlot> for SlotView {
    fn from(slot: &ScheduleSlot) -> Self {
        Self {
            time: slot.time,
            status: slot.status.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleView {
    pub id: uuid::Uuid,
    pub technician_id: uuid::Uuid,
    pub date: NaiveDate,
    pub address: Address,
    pub location: GeoPoint,
    pub is_active: bool,
    pub slots: Vec<SlotView>,
}

impl ScheduleView {
    #[must_use]
    pub fn slot(&self, time: DateTime<Utc>) -> Option<&SlotView> {
        self.slots.iter().find(|slot| slot.time == time)
    }
}

impl TryFrom<&ScheduleWithSlots> for ScheduleView {
    type Error = ServiceError;

    fn try_from(row: &ScheduleWithSlots) -> ServiceResult<Self> {
        let schedule = &row.schedule;
        Ok(Self {
            id: schedule.id,
            technician_id: schedule.technician_id,
            date: schedule.date,
            address: address_of(&schedule.address)?,
            location: GeoPoint {
                longitude: schedule.longitude,
                latitude: schedule.latitude,
            },
            is_active: schedule.is_active,
            slots: row.slots.iter().map(SlotView::from).collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestView {
    pub id: uuid::Uuid,
    pub schedule_id: uuid::Uuid,
    pub customer_id: uuid::Uuid,
    pub time: DateTime<Utc>,
    pub address: Address,
    pub description: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&BookingRequest> for RequestView {
    type Error = ServiceError;

    fn try_from(row: &BookingRequest) -> ServiceResult<Self> {
        Ok(Self {
            id: row.id,
            schedule_id: row.schedule_id,
            customer_id: row.customer_id,
            time: row.time,
            address: address_of(&row.address)?,
            description: row.description.clone(),
            status: row.status.into(),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingView {
    pub id: uuid::Uuid,
    pub request_id: uuid::Uuid,
    pub customer_id: uuid::Uuid,
    pub technician_id: uuid::Uuid,
    pub service_id: uuid::Uuid,
    pub customer_address: Address,
    pub time: DateTime<Utc>,
    pub date: NaiveDate,
    pub status: BookingStatus,
    pub description: String,
    pub payment_id: Option<uuid::Uuid>,
    pub review_id: Option<uuid::Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&Booking> for BookingView {
    type Error = ServiceError;

    fn try_from(row: &Booking) -> ServiceResult<Self> {
        Ok(Self {
            id: row.id,
            request_id: row.request_id,
            customer_id: row.customer_id,
            technician_id: row.technician_id,
            service_id: row.service_id,
            customer_address: address_of(&row.customer_address)?,
            time: row.time,
            date: row.date,
            status: row.status.into(),
            description: row.description.clone(),
            payment_id: row.payment_id,
            review_id: row.review_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentView {
    pub id: uuid::Uuid,
    pub booking_id: uuid::Uuid,
    pub amount: i64,
    pub currency: String,
    pub mode: PaymentMode,
    pub status: PaymentStatus,
    pub site_fee: Option<i64>,
    /// Present for online payments until the client completes them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Payment> for PaymentView {
    fn from(row: &Payment) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            amount: row.amount,
            currency: row.currency.clone(),
            mode: row.mode.into(),
            status: row.status.into(),
            site_fee: row.site_fee,
            client_secret: row.client_secret.clone(),
            completed_at: row.completed_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewView {
    pub id: uuid::Uuid,
    pub booking_id: uuid::Uuid,
    pub technician_id: uuid::Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Review> for ReviewView {
    fn from(row: &Review) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            technician_id: row.technician_id,
            rating: row.rating,
            comment: row.comment.clone(),
            created_at: row.created_at,
        }
    }
}
