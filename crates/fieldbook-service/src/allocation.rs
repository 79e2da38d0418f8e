//! Allocation engine: turns exactly one pending request into a booking.
//!
//! ## Summary
//! Promotion runs in one transaction, and its first write is the
//! conditional slot flip `available -> booked`. Concurrent promotions for the
//! same slot serialize on that row; every loser matches zero rows, rolls back
//! and reports `SlotAlreadyTaken`, so a booking exists exactly when its slot
//! is booked.

use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use serde::Serialize;

use fieldbook_core::types::RequestStatus as CoreRequestStatus;

use fieldbook_db::db::connection::DbConnection;
use fieldbook_db::db::enums::{BookingStatus, RequestStatus, SlotStatus};
use fieldbook_db::db::query::{booking, request, slot, technician};
use fieldbook_db::model::booking::NewBooking;
use fieldbook_db::model::request::BookingRequest;
use fieldbook_db::model::schedule::Schedule;

use crate::error::{ServiceError, ServiceResult};
use crate::identity::Actor;
use crate::notify::{self, DomainEvent};
use crate::view::{BookingView, RequestView};

/// Result of a successful promotion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Promotion {
    pub booking: BookingView,
    /// Competing requests for the same slot that were cancelled.
    pub cancelled_request_ids: Vec<uuid::Uuid>,
}

/// Loads a request with its schedule and checks that the actor owns the schedule.
async fn load_owned(
    conn: &mut DbConnection<'_>,
    actor: &Actor,
    request_id: uuid::Uuid,
) -> ServiceResult<(BookingRequest, Schedule)> {
    let (found, owner) = request::get_with_schedule(conn, request_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Request".to_string()))?;
    actor.require_owner(owner.technician_id, "Request")?;
    Ok((found, owner))
}

/// Explains why a conditional update of a request matched no row.
async fn request_conflict(
    conn: &mut DbConnection<'_>,
    request_id: uuid::Uuid,
    to: CoreRequestStatus,
) -> ServiceError {
    match request::get(conn, request_id).await {
        Ok(Some(current)) => match CoreRequestStatus::from(current.status).transition(to) {
            Err(e) => e.into(),
            Ok(_) => ServiceError::InvariantViolation("pending request failed conditional update"),
        },
        Ok(None) => ServiceError::NotFound("Request".to_string()),
        Err(e) => e.into(),
    }
}

/// ## Summary
/// Accepts a pending request: creates the booking, books the slot, marks the
/// request booked and cancels every other pending request for that slot.
///
/// ## Side Effects
/// - `BookingConfirmed` is queued for the customer
/// - `RequestRejected` is queued for each cancelled competitor
/// - On `SlotAlreadyTaken` the request itself is cancelled
///
/// ## Errors
/// - `NotFound` if the request or its slot does not exist
/// - `Forbidden` unless the actor owns the schedule
/// - `ValidationError` if the schedule was deactivated
/// - `InvalidTransition` if the request is no longer pending
/// - `SlotAlreadyTaken` if another request already holds the slot
#[tracing::instrument(skip(conn), fields(actor = %actor))]
pub async fn promote(
    conn: &mut DbConnection<'_>,
    actor: &Actor,
    request_id: uuid::Uuid,
) -> ServiceResult<Promotion> {
    let (found, owner) = load_owned(conn, actor, request_id).await?;

    if !owner.is_active {
        return Err(ServiceError::ValidationError(
            "schedule is no longer active".to_string(),
        ));
    }

    let profile = technician::get(conn, owner.technician_id)
        .await?
        .ok_or(ServiceError::NotApproved)?;

    let result = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                if !slot::transition(
                    tx,
                    owner.id,
                    found.time,
                    SlotStatus::Available,
                    SlotStatus::Booked,
                )
                .await?
                {
                    return Err(match slot::get(tx, owner.id, found.time).await? {
                        Some(_) => ServiceError::SlotAlreadyTaken,
                        None => ServiceError::NotFound("Slot".to_string()),
                    });
                }

                if !request::transition(tx, found.id, RequestStatus::Pending, RequestStatus::Booked)
                    .await?
                {
                    return Err(request_conflict(tx, found.id, CoreRequestStatus::Booked).await);
                }

                let created = booking::insert(
                    tx,
                    &NewBooking {
                        id: uuid::Uuid::now_v7(),
                        request_id: found.id,
                        customer_id: found.customer_id,
                        technician_id: owner.technician_id,
                        service_id: profile.service_id,
                        customer_address: found.address.clone(),
                        time: found.time,
                        date: owner.date,
                        status: BookingStatus::Confirmed,
                        description: &found.description,
                    },
                )
                .await?;

                let siblings =
                    request::cancel_pending_siblings(tx, owner.id, found.time, found.id).await?;

                let mut events = Vec::with_capacity(siblings.len() + 1);
                events.push(DomainEvent::BookingConfirmed {
                    booking_id: created.id,
                    request_id: found.id,
                    customer_id: found.customer_id,
                    technician_id: owner.technician_id,
                    time: found.time,
                });
                events.extend(siblings.iter().map(|sibling| DomainEvent::RequestRejected {
                    request_id: sibling.id,
                    customer_id: sibling.customer_id,
                    time: sibling.time,
                }));
                notify::enqueue(tx, &events).await?;

                Ok(Promotion {
                    booking: BookingView::try_from(&created)?,
                    cancelled_request_ids: siblings.iter().map(|s| s.id).collect(),
                })
            }
            .scope_boxed()
        })
        .await;

    match result {
        Ok(promotion) => {
            tracing::info!(
                booking_id = %promotion.booking.id,
                cancelled = promotion.cancelled_request_ids.len(),
                "Request promoted"
            );
            Ok(promotion)
        }
        Err(ServiceError::SlotAlreadyTaken) => {
            tracing::info!("Slot already taken; cancelling request");
            if let Err(e) = request::transition(
                conn,
                request_id,
                RequestStatus::Pending,
                RequestStatus::Cancelled,
            )
            .await
            {
                tracing::warn!(error = %e, "Failed to cancel losing request");
            }
            Err(ServiceError::SlotAlreadyTaken)
        }
        Err(e) => Err(e),
    }
}

/// ## Summary
/// Declines a pending request without creating a booking.
///
/// ## Errors
/// - `NotFound` if the request does not exist
/// - `Forbidden` unless the actor owns the schedule
/// - `InvalidTransition` if the request is no longer pending
#[tracing::instrument(skip(conn), fields(actor = %actor))]
pub async fn reject(
    conn: &mut DbConnection<'_>,
    actor: &Actor,
    request_id: uuid::Uuid,
) -> ServiceResult<RequestView> {
    let (found, _owner) = load_owned(conn, actor, request_id).await?;
    CoreRequestStatus::from(found.status).transition(CoreRequestStatus::Cancelled)?;

    let customer_id = found.customer_id;
    let time = found.time;

    conn.transaction::<_, ServiceError, _>(move |tx| {
        async move {
            if !request::transition(
                tx,
                request_id,
                RequestStatus::Pending,
                RequestStatus::Cancelled,
            )
            .await?
            {
                return Err(request_conflict(tx, request_id, CoreRequestStatus::Cancelled).await);
            }
            notify::enqueue(
                tx,
                &[DomainEvent::RequestRejected {
                    request_id,
                    customer_id,
                    time,
                }],
            )
            .await
        }
        .scope_boxed()
    })
    .await?;

    tracing::info!("Request rejected");
    let updated = request::get(conn, request_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Request".to_string()))?;
    RequestView::try_from(&updated)
}
