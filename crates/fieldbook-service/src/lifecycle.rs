//! Booking lifecycle: settlement, cancellation and reviews.
//!
//! ```text
//! confirmed --(cash settle | online confirm)--> completed
//! confirmed --(cancel, outside window)--------> cancelled
//! ```

use chrono::{DateTime, Utc};
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use serde::{Deserialize, Serialize};

use fieldbook_core::constants::{MAX_RATING, MIN_RATING};
use fieldbook_core::fee::site_fee;
use fieldbook_core::types::{BookingStatus as CoreBookingStatus, PaymentMode, Role};
use fieldbook_db::db::connection::DbConnection;
use fieldbook_db::db::enums::{BookingStatus, PaymentStatus, RequestStatus, SlotStatus};
use fieldbook_db::db::query::{booking, payment, request, review, schedule, slot};
use fieldbook_db::model::booking::Booking;
use fieldbook_db::model::payment::NewPayment;
use fieldbook_db::model::review::NewReview;

use crate::error::{ServiceError, ServiceResult};
use crate::identity::Actor;
use crate::notify::{self, DomainEvent};
use crate::payment::{IntentRequest, PaymentIntentProvider};
use crate::rules::BookingRules;
use crate::view::{BookingView, PaymentView, ReviewView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SettlePayment {
    /// Integer currency units.
    pub amount: i64,
    pub mode: PaymentMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    pub booking: BookingView,
    pub payment: PaymentView,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitReview {
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

async fn load(conn: &mut DbConnection<'_>, booking_id: uuid::Uuid) -> ServiceResult<Booking> {
    booking::get(conn, booking_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Booking".to_string()))
}

fn require_participant(actor: &Actor, found: &Booking) -> ServiceResult<()> {
    if found.is_participant(actor.id) || actor.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "Booking belongs to someone else".to_string(),
        ))
    }
}

/// Explains why a conditional update of a booking matched no row.
async fn booking_conflict(
    conn: &mut DbConnection<'_>,
    booking_id: uuid::Uuid,
    to: CoreBookingStatus,
) -> ServiceError {
    match booking::get(conn, booking_id).await {
        Ok(Some(current))
            if current.payment_id.is_some() && current.status == BookingStatus::Confirmed =>
        {
            ServiceError::AlreadyExists("Payment".to_string())
        }
        Ok(Some(current)) => match CoreBookingStatus::from(current.status).transition(to) {
            Err(e) => e.into(),
            Ok(_) => {
                ServiceError::InvariantViolation("confirmed booking failed conditional update")
            }
        },
        Ok(None) => ServiceError::NotFound("Booking".to_string()),
        Err(e) => e.into(),
    }
}

/// ## Summary
/// Loads a booking visible to the actor.
///
/// ## Errors
/// `NotFound`, or `Forbidden` unless the actor is a participant.
pub async fn get(
    conn: &mut DbConnection<'_>,
    actor: &Actor,
    booking_id: uuid::Uuid,
) -> ServiceResult<BookingView> {
    let found = load(conn, booking_id).await?;
    require_participant(actor, &found)?;
    BookingView::try_from(&found)
}

/// ## Errors
/// Returns an error if the database operation fails.
pub async fn list_for_customer(
    conn: &mut DbConnection<'_>,
    customer_id: uuid::Uuid,
    status: Option<CoreBookingStatus>,
) -> ServiceResult<Vec<BookingView>> {
    booking::load_filtered(conn, booking::by_customer(customer_id), status.map(Into::into))
        .await?
        .iter()
        .map(BookingView::try_from)
        .collect()
}

/// ## Errors
/// Returns an error if the database operation fails.
pub async fn list_for_technician(
    conn: &mut DbConnection<'_>,
    technician_id: uuid::Uuid,
    status: Option<CoreBookingStatus>,
) -> ServiceResult<Vec<BookingView>> {
    booking::load_filtered(conn, booking::by_technician(technician_id), status.map(Into::into))
        .await?
        .iter()
        .map(BookingView::try_from)
        .collect()
}

/// ## Summary
/// Lists the actor's bookings in the role they act in.
///
/// ## Errors
/// Returns `Forbidden` for admins, who have no bookings of their own.
pub async fn list_for_actor(
    conn: &mut DbConnection<'_>,
    actor: &Actor,
    status: Option<CoreBookingStatus>,
) -> ServiceResult<Vec<BookingView>> {
    match actor.role {
        Role::Customer => list_for_customer(conn, actor.id, status).await,
        Role::Technician => list_for_technician(conn, actor.id, status).await,
        Role::Admin => Err(ServiceError::Forbidden(
            "admins have no bookings of their own".to_string(),
        )),
    }
}

/// ## Summary
/// Records payment for a confirmed booking.
///
/// Cash completes the payment and the booking at once. Online payments
/// first obtain a client secret from the provider, outside any transaction,
/// and stay pending until [`confirm_online_payment`].
///
/// ## Errors
/// - `ValidationError` for a non-positive amount
/// - `NotFound`, or `Forbidden` unless the actor is the booking's technician
/// - `InvalidTransition` unless the booking is confirmed
/// - `AlreadyExists` if a payment is already linked
/// - `PaymentFailed` if the provider fails; the booking stays confirmed
#[tracing::instrument(skip(conn, rules, provider), fields(actor = %actor))]
pub async fn settle_payment(
    conn: &mut DbConnection<'_>,
    actor: &Actor,
    rules: &BookingRules,
    provider: &dyn PaymentIntentProvider,
    booking_id: uuid::Uuid,
    input: SettlePayment,
) -> ServiceResult<Settlement> {
    if input.amount <= 0 {
        return Err(ServiceError::ValidationError(
            "amount must be positive".to_string(),
        ));
    }

    let found = load(conn, booking_id).await?;
    actor.require_owner(found.technician_id, "Booking")?;
    CoreBookingStatus::from(found.status).transition(CoreBookingStatus::Completed)?;
    if found.payment_id.is_some() {
        return Err(ServiceError::AlreadyExists("Payment".to_string()));
    }

    let client_secret = match input.mode {
        PaymentMode::Cash => None,
        PaymentMode::Online => {
            let intent = provider
                .create_intent(IntentRequest {
                    booking_id,
                    amount: input.amount,
                    currency: &rules.currency,
                })
                .await
                .map_err(|e| {
                    tracing::warn!(error = %e, "Payment intent creation failed");
                    ServiceError::PaymentFailed(e.to_string())
                })?;
            Some(intent.client_secret)
        }
    };

    let status = input.mode.initial_status();
    let now = Utc::now();
    let (fee, completed_at) = match status {
        fieldbook_core::types::PaymentStatus::Completed => {
            (Some(site_fee(input.amount, rules.site_fee_percent)?), Some(now))
        }
        fieldbook_core::types::PaymentStatus::Pending => (None, None),
    };
    let completes = completed_at.is_some();
    let currency = rules.currency.clone();
    let customer_id = found.customer_id;

    let settlement = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                let created = payment::insert(
                    tx,
                    &NewPayment {
                        id: uuid::Uuid::now_v7(),
                        booking_id,
                        amount: input.amount,
                        currency: &currency,
                        mode: input.mode.into(),
                        status: status.into(),
                        site_fee: fee,
                        client_secret: client_secret.as_deref(),
                        completed_at,
                    },
                )
                .await?;

                let Some(updated) =
                    booking::link_payment(tx, booking_id, created.id, completes).await?
                else {
                    return Err(
                        booking_conflict(tx, booking_id, CoreBookingStatus::Completed).await,
                    );
                };

                if completes {
                    notify::enqueue(
                        tx,
                        &[DomainEvent::PaymentSettled {
                            booking_id,
                            payment_id: created.id,
                            recipient_id: customer_id,
                            amount: created.amount,
                            currency: created.currency.clone(),
                            mode: input.mode,
                        }],
                    )
                    .await?;
                }

                Ok(Settlement {
                    booking: BookingView::try_from(&updated)?,
                    payment: PaymentView::from(&created),
                })
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(
        payment_id = %settlement.payment.id,
        mode = %input.mode,
        "Payment recorded"
    );
    Ok(settlement)
}

/// ## Summary
/// Completes a pending online payment once the provider has confirmed it,
/// records the site fee and completes the booking. Confirming an already
/// completed payment returns it unchanged.
///
/// ## Errors
/// - `NotFound` for an unknown payment
/// - `Forbidden` unless the actor is a participant of the booking
#[tracing::instrument(skip(conn, rules), fields(actor = %actor))]
pub async fn confirm_online_payment(
    conn: &mut DbConnection<'_>,
    actor: &Actor,
    rules: &BookingRules,
    payment_id: uuid::Uuid,
) -> ServiceResult<Settlement> {
    let pending = payment::get(conn, payment_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Payment".to_string()))?;
    let found = load(conn, pending.booking_id).await?;
    require_participant(actor, &found)?;

    if pending.status == PaymentStatus::Completed {
        tracing::debug!("Payment already completed");
        return Ok(Settlement {
            booking: BookingView::try_from(&found)?,
            payment: PaymentView::from(&pending),
        });
    }

    let fee = site_fee(pending.amount, rules.site_fee_percent)?;
    let booking_id = found.id;
    let technician_id = found.technician_id;

    let settlement = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                let completed = match payment::complete(tx, payment_id, fee, Utc::now()).await? {
                    Some(completed) => completed,
                    None => {
                        // Completed concurrently; report the current state.
                        let current = payment::get(tx, payment_id)
                            .await?
                            .ok_or_else(|| ServiceError::NotFound("Payment".to_string()))?;
                        let current_booking = booking::get(tx, booking_id)
                            .await?
                            .ok_or_else(|| ServiceError::NotFound("Booking".to_string()))?;
                        return Ok(Settlement {
                            booking: BookingView::try_from(&current_booking)?,
                            payment: PaymentView::from(&current),
                        });
                    }
                };

                let Some(updated) = booking::transition(
                    tx,
                    booking_id,
                    BookingStatus::Confirmed,
                    BookingStatus::Completed,
                )
                .await?
                else {
                    return Err(
                        booking_conflict(tx, booking_id, CoreBookingStatus::Completed).await,
                    );
                };

                notify::enqueue(
                    tx,
                    &[DomainEvent::PaymentSettled {
                        booking_id,
                        payment_id,
                        recipient_id: technician_id,
                        amount: completed.amount,
                        currency: completed.currency.clone(),
                        mode: completed.mode.into(),
                    }],
                )
                .await?;

                Ok(Settlement {
                    booking: BookingView::try_from(&updated)?,
                    payment: PaymentView::from(&completed),
                })
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(site_fee = fee, "Online payment confirmed");
    Ok(settlement)
}

/// ## Summary
/// Cancels a confirmed booking if the appointment is more than the
/// cancellation window away from `now`. Either participant may cancel; the
/// other one is notified.
///
/// When slots are released on cancel, the originating request is cancelled
/// too so the time can be requested and promoted again.
///
/// ## Errors
/// - `NotFound`, or `Forbidden` unless the actor is a participant
/// - `InvalidTransition` unless the booking is confirmed
/// - `CancellationWindowClosed` inside the window
#[tracing::instrument(skip(conn, rules), fields(actor = %actor))]
pub async fn cancel(
    conn: &mut DbConnection<'_>,
    actor: &Actor,
    rules: &BookingRules,
    booking_id: uuid::Uuid,
    now: DateTime<Utc>,
) -> ServiceResult<BookingView> {
    let found = load(conn, booking_id).await?;
    let recipient_id = match found.counterparty_of(actor.id) {
        Some(other) => other,
        None if actor.is_admin() => found.customer_id,
        None => {
            return Err(ServiceError::Forbidden(
                "Booking belongs to someone else".to_string(),
            ));
        }
    };

    CoreBookingStatus::from(found.status).transition(CoreBookingStatus::Cancelled)?;
    if !rules.cancellation.allows(now, found.time) {
        tracing::debug!(
            cutoff = %rules.cancellation.cutoff(found.time),
            "Cancellation window closed"
        );
        return Err(ServiceError::CancellationWindowClosed);
    }

    let release_slot = rules.release_slot_on_cancel;
    let cancelled_by = actor.id;

    let updated = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                let Some(updated) = booking::transition(
                    tx,
                    booking_id,
                    BookingStatus::Confirmed,
                    BookingStatus::Cancelled,
                )
                .await?
                else {
                    return Err(
                        booking_conflict(tx, booking_id, CoreBookingStatus::Cancelled).await,
                    );
                };

                if release_slot
                    && let Some(day) =
                        schedule::find_with_slots(tx, updated.technician_id, updated.date).await?
                {
                    let released = slot::transition(
                        tx,
                        day.schedule.id,
                        updated.time,
                        SlotStatus::Booked,
                        SlotStatus::Available,
                    )
                    .await?;
                    // A freed slot must not keep a booked request, or the time stays
                    // hidden from the pending view and can be booked twice.
                    let revoked = released
                        && request::transition(
                            tx,
                            updated.request_id,
                            RequestStatus::Booked,
                            RequestStatus::Cancelled,
                        )
                        .await?;
                    tracing::debug!(released, revoked, "Slot release on cancel");
                }

                notify::enqueue(
                    tx,
                    &[DomainEvent::BookingCancelled {
                        booking_id,
                        cancelled_by,
                        recipient_id,
                        time: updated.time,
                    }],
                )
                .await?;

                Ok(updated)
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!("Booking cancelled");
    BookingView::try_from(&updated)
}

/// ## Summary
/// Sets the booking's review reference. Only the first call succeeds.
///
/// ## Errors
/// - `NotFound` for an unknown booking
/// - `ReviewAlreadyExists` if a review is already attached
#[tracing::instrument(skip(conn))]
pub async fn attach_review(
    conn: &mut DbConnection<'_>,
    booking_id: uuid::Uuid,
    review_id: uuid::Uuid,
) -> ServiceResult<BookingView> {
    load(conn, booking_id).await?;
    if !booking::attach_review(conn, booking_id, review_id).await? {
        return Err(ServiceError::ReviewAlreadyExists);
    }
    BookingView::try_from(&load(conn, booking_id).await?)
}

/// ## Summary
/// Records the customer's review of a completed booking and attaches it.
///
/// ## Errors
/// - `NotFound`, or `Forbidden` unless the actor is the booking's customer
/// - `ValidationError` for a rating outside 1..=5 or a booking that is not completed
/// - `ReviewAlreadyExists` if the booking was already reviewed
#[tracing::instrument(skip(conn, input), fields(actor = %actor))]
pub async fn submit_review(
    conn: &mut DbConnection<'_>,
    actor: &Actor,
    booking_id: uuid::Uuid,
    input: SubmitReview,
) -> ServiceResult<ReviewView> {
    if !(MIN_RATING..=MAX_RATING).contains(&input.rating) {
        return Err(ServiceError::ValidationError(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }

    let found = load(conn, booking_id).await?;
    if found.customer_id != actor.id {
        return Err(ServiceError::Forbidden(
            "only the customer can review a booking".to_string(),
        ));
    }
    if found.status != BookingStatus::Completed {
        return Err(ServiceError::ValidationError(
            "only completed bookings can be reviewed".to_string(),
        ));
    }
    if found.review_id.is_some() {
        return Err(ServiceError::ReviewAlreadyExists);
    }

    let technician_id = found.technician_id;
    let customer_id = found.customer_id;

    let created = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                let created = review::insert(
                    tx,
                    &NewReview {
                        id: uuid::Uuid::now_v7(),
                        booking_id,
                        technician_id,
                        customer_id,
                        rating: input.rating,
                        comment: input.comment.as_deref().map(str::trim).filter(|c| !c.is_empty()),
                    },
                )
                .await?;

                if !booking::attach_review(tx, booking_id, created.id).await? {
                    return Err(ServiceError::ReviewAlreadyExists);
                }
                Ok(created)
            }
            .scope_boxed()
        })
        .await
        .map_err(|e| match e {
            ServiceError::StorageError(db) if db.is_unique_violation(Some(review::BOOKING_KEY)) => {
                ServiceError::ReviewAlreadyExists
            }
            other => other,
        })?;

    tracing::info!(review_id = %created.id, rating = created.rating, "Review recorded");
    Ok(ReviewView::from(&created))
}
