//! Integration tests for promoting requests into bookings.

use fieldbook_core::types::{BookingStatus, RequestStatus, SlotStatus};
use fieldbook_service::allocation;
use fieldbook_service::availability;
use fieldbook_service::error::ServiceError;
use fieldbook_service::identity::Actor;
use fieldbook_service::ledger;
use fieldbook_service::lifecycle;

use super::helpers::*;

/// ## Summary
/// Two customers request 10:00; promoting A books the slot and cancels B, and
/// promoting B afterwards reports the slot as taken.
#[test_log::test(tokio::test)]
async fn promote_books_slot_and_cancels_competitors() {
    let db = require_db!();
    let tech = db.seed_technician(true).await.expect("seed technician");
    let day = db
        .publish(tech.id, future_date(20), ORIGIN)
        .await
        .expect("publish");
    let ten = slot_at(day.date, 10);
    let customer_a = uuid::Uuid::now_v7();
    let customer_b = uuid::Uuid::now_v7();
    let a = db.submit(customer_a, &day, ten).await.expect("request A");
    let b = db.submit(customer_b, &day, ten).await.expect("request B");

    let owner = Actor::technician(tech.id);
    let mut conn = db.get_conn().await.expect("conn");
    let promotion = allocation::promote(&mut conn, &owner, a.id)
        .await
        .expect("promote A");
    assert_eq!(promotion.booking.request_id, a.id);
    assert_eq!(promotion.booking.customer_id, customer_a);
    assert_eq!(promotion.booking.technician_id, tech.id);
    assert_eq!(promotion.booking.service_id, tech.service_id);
    assert_eq!(promotion.booking.time, ten);
    assert_eq!(promotion.booking.status, BookingStatus::Confirmed);
    assert_eq!(promotion.cancelled_request_ids, vec![b.id]);

    let schedule = availability::get_by_id(&mut conn, day.id)
        .await
        .expect("reload schedule");
    assert_eq!(schedule.slot(ten).map(|s| s.status), Some(SlotStatus::Booked));
    assert_eq!(
        schedule.slot(slot_at(day.date, 11)).map(|s| s.status),
        Some(SlotStatus::Available)
    );

    let err = allocation::promote(&mut conn, &owner, b.id)
        .await
        .expect_err("slot is gone");
    assert!(matches!(err, ServiceError::SlotAlreadyTaken), "got {err:?}");

    let b_requests = ledger::requests_for_customer(&mut conn, &Actor::customer(customer_b))
        .await
        .expect("list B");
    assert_eq!(b_requests[0].status, RequestStatus::Cancelled);
    let a_requests = ledger::requests_for_customer(&mut conn, &Actor::customer(customer_a))
        .await
        .expect("list A");
    assert_eq!(a_requests[0].status, RequestStatus::Booked);

    let bookings = lifecycle::list_for_customer(&mut conn, customer_a, None)
        .await
        .expect("bookings");
    assert_eq!(bookings.len(), 1);
    assert!(
        lifecycle::list_for_customer(&mut conn, customer_b, None)
            .await
            .expect("bookings")
            .is_empty()
    );

    let pending = ledger::pending_for_technician(&mut conn, &owner, Some(day.date))
        .await
        .expect("pending view");
    assert!(pending.is_empty());
}

/// ## Summary
/// Concurrent promotions for the same slot: exactly one wins.
#[test_log::test(tokio::test)]
async fn concurrent_promotions_book_the_slot_once() {
    let db = require_db!();
    let tech = db.seed_technician(true).await.expect("seed technician");
    let day = db
        .publish(tech.id, future_date(21), ORIGIN)
        .await
        .expect("publish");
    let two = slot_at(day.date, 14);

    let mut requests = Vec::new();
    for _ in 0..3 {
        requests.push(
            db.submit(uuid::Uuid::now_v7(), &day, two)
                .await
                .expect("request"),
        );
    }

    let owner = Actor::technician(tech.id);
    let attempts = requests.iter().map(|request| {
        let db = &db;
        async move {
            let mut conn = db.get_conn().await.expect("conn");
            allocation::promote(&mut conn, &owner, request.id).await
        }
    });
    let results = futures::future::join_all(attempts).await;

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "results: {results:?}");
    for result in &results {
        if let Err(err) = result {
            assert!(matches!(err, ServiceError::SlotAlreadyTaken), "got {err:?}");
        }
    }

    let mut conn = db.get_conn().await.expect("conn");
    let booked: usize = {
        let mut count = 0;
        for request in &requests {
            count += lifecycle::list_for_customer(&mut conn, request.customer_id, None)
                .await
                .expect("bookings")
                .len();
        }
        count
    };
    assert_eq!(booked, 1);
}

#[test_log::test(tokio::test)]
async fn only_the_schedule_owner_can_promote() {
    let db = require_db!();
    let tech = db.seed_technician(true).await.expect("seed technician");
    let intruder = db.seed_technician(true).await.expect("seed technician");
    let day = db
        .publish(tech.id, future_date(22), ORIGIN)
        .await
        .expect("publish");
    let request = db
        .submit(uuid::Uuid::now_v7(), &day, slot_at(day.date, 9))
        .await
        .expect("request");

    let mut conn = db.get_conn().await.expect("conn");
    let err = allocation::promote(&mut conn, &Actor::technician(intruder.id), request.id)
        .await
        .expect_err("not the owner");
    assert!(matches!(err, ServiceError::Forbidden(_)), "got {err:?}");

    let err = allocation::promote(&mut conn, &Actor::technician(tech.id), uuid::Uuid::now_v7())
        .await
        .expect_err("unknown request");
    assert!(matches!(err, ServiceError::NotFound(_)), "got {err:?}");

    let schedule = availability::get_by_id(&mut conn, day.id)
        .await
        .expect("reload schedule");
    assert_eq!(
        schedule.slot(slot_at(day.date, 9)).map(|s| s.status),
        Some(SlotStatus::Available)
    );
}

#[test_log::test(tokio::test)]
async fn reject_cancels_pending_request_once() {
    let db = require_db!();
    let tech = db.seed_technician(true).await.expect("seed technician");
    let day = db
        .publish(tech.id, future_date(23), ORIGIN)
        .await
        .expect("publish");
    let request = db
        .submit(uuid::Uuid::now_v7(), &day, slot_at(day.date, 12))
        .await
        .expect("request");
    let owner = Actor::technician(tech.id);

    let mut conn = db.get_conn().await.expect("conn");
    let rejected = allocation::reject(&mut conn, &owner, request.id)
        .await
        .expect("reject");
    assert_eq!(rejected.status, RequestStatus::Cancelled);

    let err = allocation::reject(&mut conn, &owner, request.id)
        .await
        .expect_err("already cancelled");
    assert!(matches!(err, ServiceError::InvalidTransition { .. }), "got {err:?}");

    let err = allocation::promote(&mut conn, &owner, request.id)
        .await
        .expect_err("cancelled requests cannot be promoted");
    assert!(matches!(err, ServiceError::InvalidTransition { .. }), "got {err:?}");

    let schedule = availability::get_by_id(&mut conn, day.id)
        .await
        .expect("reload schedule");
    assert_eq!(
        schedule.slot(slot_at(day.date, 12)).map(|s| s.status),
        Some(SlotStatus::Available)
    );
}

#[test_log::test(tokio::test)]
async fn promote_on_deactivated_schedule_is_rejected() {
    let db = require_db!();
    let tech = db.seed_technician(true).await.expect("seed technician");
    let day = db
        .publish(tech.id, future_date(24), ORIGIN)
        .await
        .expect("publish");
    let request = db
        .submit(uuid::Uuid::now_v7(), &day, slot_at(day.date, 16))
        .await
        .expect("request");
    let owner = Actor::technician(tech.id);

    let mut conn = db.get_conn().await.expect("conn");
    availability::deactivate(&mut conn, &owner, day.id)
        .await
        .expect("deactivate");
    let err = allocation::promote(&mut conn, &owner, request.id)
        .await
        .expect_err("inactive schedule");
    assert!(matches!(err, ServiceError::ValidationError(_)), "got {err:?}");
}
