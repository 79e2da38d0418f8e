use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::review)]
#[diesel(check_for_backend(Pg))]
pub struct Review {
    pub id: uuid::Uuid,
    pub booking_id: uuid::Uuid,
    pub technician_id: uuid::Uuid,
    pub customer_id: uuid::Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::review)]
pub struct NewReview<'a> {
    pub id: uuid::Uuid,
    pub booking_id: uuid::Uuid,
    pub technician_id: uuid::Uuid,
    pub customer_id: uuid::Uuid,
    pub rating: i32,
    pub comment: Option<&'a str>,
}
