use diesel::{pg::Pg, prelude::*};
use serde_json::Value as JsonValue;

use crate::db::{enums::SlotStatus, schema};

/// A technician's published availability for one calendar date.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = schema::schedule)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(super::technician::Technician, foreign_key = technician_id))]
pub struct Schedule {
    pub id: uuid::Uuid,
    pub technician_id: uuid::Uuid,
    pub date: chrono::NaiveDate,
    /// Street address document (`fieldbook_core::types::Address`).
    pub address: JsonValue,
    pub longitude: f64,
    pub latitude: f64,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::schedule)]
pub struct NewSchedule {
    pub id: uuid::Uuid,
    pub technician_id: uuid::Uuid,
    pub date: chrono::NaiveDate,
    pub address: JsonValue,
    pub longitude: f64,
    pub latitude: f64,
}

/// One bookable time within a schedule, keyed by `(schedule_id, time)`.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = schema::schedule_slot)]
#[diesel(primary_key(schedule_id, time))]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(Schedule, foreign_key = schedule_id))]
pub struct ScheduleSlot {
    pub schedule_id: uuid::Uuid,
    pub time: chrono::DateTime<chrono::Utc>,
    pub status: SlotStatus,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::schedule_slot)]
pub struct NewScheduleSlot {
    pub schedule_id: uuid::Uuid,
    pub time: chrono::DateTime<chrono::Utc>,
    pub status: SlotStatus,
}

/// A schedule together with its ordered slots.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleWithSlots {
    pub schedule: Schedule,
    pub slots: Vec<ScheduleSlot>,
}
