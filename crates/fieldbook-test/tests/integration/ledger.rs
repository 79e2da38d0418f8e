//! Integration tests for submitting and listing booking requests.

use fieldbook_core::types::RequestStatus;
use fieldbook_service::error::ServiceError;
use fieldbook_service::identity::Actor;
use fieldbook_service::ledger;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn duplicate_request_is_suppressed() {
    let db = require_db!();
    let tech = db.seed_technician(true).await.expect("seed technician");
    let day = db
        .publish(tech.id, future_date(12), ORIGIN)
        .await
        .expect("publish");
    let customer = uuid::Uuid::now_v7();
    let ten = slot_at(day.date, 10);

    let first = db.submit(customer, &day, ten).await.expect("first request");
    assert_eq!(first.status, RequestStatus::Pending);

    let mut conn = db.get_conn().await.expect("conn");
    let err = ledger::submit(&mut conn, &Actor::customer(customer), submit_request(&day, ten))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, ServiceError::DuplicateRequest), "got {err:?}");

    let mine = ledger::requests_for_customer(&mut conn, &Actor::customer(customer))
        .await
        .expect("list");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, first.id);
}

#[test_log::test(tokio::test)]
async fn submit_validates_target_slot() {
    let db = require_db!();
    let tech = db.seed_technician(true).await.expect("seed technician");
    let other = db.seed_technician(true).await.expect("seed technician");
    let day = db
        .publish(tech.id, future_date(13), ORIGIN)
        .await
        .expect("publish");
    let customer = Actor::customer(uuid::Uuid::now_v7());
    let mut conn = db.get_conn().await.expect("conn");

    let mut wrong_owner = submit_request(&day, slot_at(day.date, 10));
    wrong_owner.technician_id = other.id;
    let err = ledger::submit(&mut conn, &customer, wrong_owner)
        .await
        .expect_err("schedule belongs to someone else");
    assert!(matches!(err, ServiceError::ValidationError(_)), "got {err:?}");

    let off_catalog = submit_request(&day, slot_at(day.date, 10) + chrono::Duration::minutes(30));
    let err = ledger::submit(&mut conn, &customer, off_catalog)
        .await
        .expect_err("no slot at 10:30");
    assert!(matches!(err, ServiceError::ValidationError(_)), "got {err:?}");

    let mut blank = submit_request(&day, slot_at(day.date, 10));
    blank.description = "   ".to_string();
    let err = ledger::submit(&mut conn, &customer, blank)
        .await
        .expect_err("blank description");
    assert!(matches!(err, ServiceError::ValidationError(_)), "got {err:?}");

    let mut unknown = submit_request(&day, slot_at(day.date, 10));
    unknown.schedule_id = uuid::Uuid::now_v7();
    let err = ledger::submit(&mut conn, &customer, unknown)
        .await
        .expect_err("unknown schedule");
    assert!(matches!(err, ServiceError::NotFound(_)), "got {err:?}");

    let err = ledger::submit(
        &mut conn,
        &Actor::technician(other.id),
        submit_request(&day, slot_at(day.date, 10)),
    )
    .await
    .expect_err("technicians cannot request");
    assert!(matches!(err, ServiceError::Forbidden(_)), "got {err:?}");
}

#[test_log::test(tokio::test)]
async fn pending_view_lists_open_requests_in_time_order() {
    let db = require_db!();
    let tech = db.seed_technician(true).await.expect("seed technician");
    let day = db
        .publish(tech.id, future_date(14), ORIGIN)
        .await
        .expect("publish");

    let late = db
        .submit(uuid::Uuid::now_v7(), &day, slot_at(day.date, 15))
        .await
        .expect("late request");
    let early = db
        .submit(uuid::Uuid::now_v7(), &day, slot_at(day.date, 9))
        .await
        .expect("early request");

    let mut conn = db.get_conn().await.expect("conn");
    let pending = ledger::pending_for_technician(&mut conn, &Actor::technician(tech.id), None)
        .await
        .expect("pending view");
    let ids: Vec<_> = pending.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![early.id, late.id]);

    let other_day = ledger::pending_for_technician(
        &mut conn,
        &Actor::technician(tech.id),
        Some(future_date(15)),
    )
    .await
    .expect("pending view");
    assert!(other_day.is_empty());
}
