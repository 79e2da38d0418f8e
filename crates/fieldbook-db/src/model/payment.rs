use diesel::{pg::Pg, prelude::*};

use crate::db::{
    enums::{PaymentMode, PaymentStatus},
    schema,
};

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::payment)]
#[diesel(check_for_backend(Pg))]
pub struct Payment {
    pub id: uuid::Uuid,
    pub booking_id: uuid::Uuid,
    pub amount: i64,
    pub currency: String,
    pub mode: PaymentMode,
    pub status: PaymentStatus,
    /// Platform cut; set once the payment is completed.
    pub site_fee: Option<i64>,
    /// Returned by the payment-intent provider for online payments.
    pub client_secret: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::payment)]
pub struct NewPayment<'a> {
    pub id: uuid::Uuid,
    pub booking_id: uuid::Uuid,
    pub amount: i64,
    pub currency: &'a str,
    pub mode: PaymentMode,
    pub status: PaymentStatus,
    pub site_fee: Option<i64>,
    pub client_secret: Option<&'a str>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}
