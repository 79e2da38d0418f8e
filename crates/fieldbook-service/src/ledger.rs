//! Request ledger: customers queue requests against a technician's slot.
//!
//! Submission does not look at slot status. Any number of customers may
//! queue for the same time; exclusivity is decided at promotion.

use chrono::{DateTime, NaiveDate, Utc};
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use serde::Deserialize;

use fieldbook_core::pending::pending_view;
use fieldbook_core::types::{Address, Role};
use fieldbook_db::db::connection::DbConnection;
use fieldbook_db::db::enums::RequestStatus;
use fieldbook_db::db::query::{request, schedule, slot};
use fieldbook_db::model::request::NewBookingRequest;

use crate::error::{ServiceError, ServiceResult};
use crate::identity::Actor;
use crate::notify::{self, DomainEvent};
use crate::view::RequestView;

/// Input for [`submit`].
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub technician_id: uuid::Uuid,
    pub schedule_id: uuid::Uuid,
    pub time: DateTime<Utc>,
    pub date: NaiveDate,
    pub address: Address,
    pub description: String,
}

/// ## Summary
/// Appends a pending request for the acting customer and notifies the
/// technician through the outbox.
///
/// ## Errors
/// - `Forbidden` if the actor is not a customer
/// - `NotFound` if the schedule does not exist
/// - `ValidationError` if the schedule does not match the technician, date
///   or time, is inactive, or the address or description is blank
/// - `DuplicateRequest` if the customer already requested this slot
#[tracing::instrument(
    skip(conn, input),
    fields(customer_id = %actor.id, schedule_id = %input.schedule_id, time = %input.time)
)]
pub async fn submit(
    conn: &mut DbConnection<'_>,
    actor: &Actor,
    input: SubmitRequest,
) -> ServiceResult<RequestView> {
    actor.require_role(Role::Customer)?;
    input.address.validate()?;
    if input.description.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "description is required".to_string(),
        ));
    }

    let target = schedule::get(conn, input.schedule_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Schedule".to_string()))?;
    if target.technician_id != input.technician_id {
        return Err(ServiceError::ValidationError(
            "schedule does not belong to this technician".to_string(),
        ));
    }
    if target.date != input.date {
        return Err(ServiceError::ValidationError(format!(
            "schedule is for {}, not {}",
            target.date, input.date
        )));
    }
    if !target.is_active {
        return Err(ServiceError::ValidationError(
            "schedule is no longer active".to_string(),
        ));
    }
    if slot::get(conn, target.id, input.time).await?.is_none() {
        return Err(ServiceError::ValidationError(format!(
            "schedule has no slot at {}",
            input.time
        )));
    }

    if request::exists_for_customer(conn, target.id, actor.id, input.time).await? {
        tracing::debug!("Duplicate request suppressed");
        return Err(ServiceError::DuplicateRequest);
    }

    let customer_id = actor.id;
    let technician_id = target.technician_id;
    let address = serde_json::to_value(&input.address)?;

    let created = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                let created = request::insert(
                    tx,
                    &NewBookingRequest {
                        id: uuid::Uuid::now_v7(),
                        schedule_id: input.schedule_id,
                        customer_id,
                        time: input.time,
                        address,
                        description: input.description.trim(),
                        status: RequestStatus::Pending,
                    },
                )
                .await?;

                notify::enqueue(
                    tx,
                    &[DomainEvent::RequestSubmitted {
                        request_id: created.id,
                        schedule_id: created.schedule_id,
                        customer_id,
                        technician_id,
                        time: created.time,
                    }],
                )
                .await?;

                Ok(created)
            }
            .scope_boxed()
        })
        .await
        .map_err(|e| match e {
            ServiceError::StorageError(db)
                if db.is_unique_violation(Some(request::CUSTOMER_SLOT_KEY)) =>
            {
                ServiceError::DuplicateRequest
            }
            other => other,
        })?;

    tracing::info!(request_id = %created.id, "Request submitted");
    RequestView::try_from(&created)
}

/// ## Summary
/// The technician's view of open requests, optionally for one date.
///
/// Slots that already have a booked request are left out entirely, and the
/// remaining pending requests are ordered by time then submission.
///
/// ## Errors
/// Returns `Forbidden` if the actor is not a technician.
pub async fn pending_for_technician(
    conn: &mut DbConnection<'_>,
    actor: &Actor,
    date: Option<NaiveDate>,
) -> ServiceResult<Vec<RequestView>> {
    actor.require_role(Role::Technician)?;
    let requests = request::for_technician(conn, actor.id, date).await?;
    pending_view(requests).iter().map(RequestView::try_from).collect()
}

/// ## Summary
/// The acting customer's own requests, newest first.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn requests_for_customer(
    conn: &mut DbConnection<'_>,
    actor: &Actor,
) -> ServiceResult<Vec<RequestView>> {
    request::for_customer(conn, actor.id)
        .await?
        .iter()
        .map(RequestView::try_from)
        .collect()
}
