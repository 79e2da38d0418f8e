//! Integration tests for publishing and reading schedules.

use chrono::{Duration, Utc};
use fieldbook_core::types::SlotStatus;
use fieldbook_service::availability::{self, PublishSchedule};
use fieldbook_service::error::ServiceError;
use fieldbook_service::identity::Actor;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn publish_creates_every_catalog_slot() {
    let db = require_db!();
    let tech = db.seed_technician(true).await.expect("seed technician");
    let date = future_date(10);

    let published = db.publish(tech.id, date, ORIGIN).await.expect("publish");
    assert_eq!(published.date, date);
    assert!(published.is_active);
    assert_eq!(published.slots.len(), 9);
    assert!(published.slots.iter().all(|s| s.status == SlotStatus::Available));
    assert_eq!(published.slots[0].time, slot_at(date, 9));
    assert_eq!(published.slots[8].time, slot_at(date, 17));

    let mut conn = db.get_conn().await.expect("conn");
    let fetched = availability::get(&mut conn, tech.id, date)
        .await
        .expect("get schedule");
    assert_eq!(fetched, published);
}

#[test_log::test(tokio::test)]
async fn publish_twice_for_same_date_conflicts() {
    let db = require_db!();
    let tech = db.seed_technician(true).await.expect("seed technician");
    let date = future_date(11);

    db.publish(tech.id, date, ORIGIN).await.expect("first publish");
    let mut conn = db.get_conn().await.expect("conn");
    let err = availability::publish(
        &mut conn,
        &Actor::technician(tech.id),
        &rules(),
        &PublishSchedule {
            date,
            address: address("2 Other St"),
            coordinates: ORIGIN.to_vec(),
        },
        Utc::now(),
    )
    .await
    .expect_err("second publish must fail");
    assert!(matches!(err, ServiceError::AlreadyExists(_)), "got {err:?}");
}

#[test_log::test(tokio::test)]
async fn publish_checks_role_approval_and_date() {
    let db = require_db!();
    let unapproved = db.seed_technician(false).await.expect("seed technician");
    let approved = db.seed_technician(true).await.expect("seed technician");
    let mut conn = db.get_conn().await.expect("conn");
    let input = |date| PublishSchedule {
        date,
        address: address("3 Third St"),
        coordinates: ORIGIN.to_vec(),
    };

    let err = availability::publish(
        &mut conn,
        &Actor::technician(unapproved.id),
        &rules(),
        &input(future_date(3)),
        Utc::now(),
    )
    .await
    .expect_err("unapproved technician");
    assert!(matches!(err, ServiceError::NotApproved), "got {err:?}");

    let err = availability::publish(
        &mut conn,
        &Actor::customer(approved.id),
        &rules(),
        &input(future_date(3)),
        Utc::now(),
    )
    .await
    .expect_err("customers cannot publish");
    assert!(matches!(err, ServiceError::Forbidden(_)), "got {err:?}");

    let err = availability::publish(
        &mut conn,
        &Actor::technician(approved.id),
        &rules(),
        &input(Utc::now().date_naive() - Duration::days(1)),
        Utc::now(),
    )
    .await
    .expect_err("past date");
    assert!(matches!(err, ServiceError::ValidationError(_)), "got {err:?}");

    let mut bad_point = input(future_date(3));
    bad_point.coordinates = vec![200.0, 41.0];
    let err = availability::publish(
        &mut conn,
        &Actor::technician(approved.id),
        &rules(),
        &bad_point,
        Utc::now(),
    )
    .await
    .expect_err("longitude out of range");
    assert!(matches!(err, ServiceError::ValidationError(_)), "got {err:?}");
}

#[test_log::test(tokio::test)]
async fn get_unpublished_date_is_not_found() {
    let db = require_db!();
    let tech = db.seed_technician(true).await.expect("seed technician");
    let mut conn = db.get_conn().await.expect("conn");

    let err = availability::get(&mut conn, tech.id, future_date(4))
        .await
        .expect_err("nothing published");
    assert!(matches!(err, ServiceError::NotFound(_)), "got {err:?}");
}

#[test_log::test(tokio::test)]
async fn list_and_deactivate_schedules() {
    let db = require_db!();
    let tech = db.seed_technician(true).await.expect("seed technician");
    let other = db.seed_technician(true).await.expect("seed technician");
    let first = db
        .publish(tech.id, future_date(5), ORIGIN)
        .await
        .expect("publish");
    let second = db
        .publish(tech.id, future_date(6), ORIGIN)
        .await
        .expect("publish");

    let mut conn = db.get_conn().await.expect("conn");
    let listed = availability::list_for_technician(&mut conn, tech.id, future_date(6))
        .await
        .expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, second.id);

    let err = availability::deactivate(&mut conn, &Actor::technician(other.id), first.id)
        .await
        .expect_err("not the owner");
    assert!(matches!(err, ServiceError::Forbidden(_)), "got {err:?}");

    let deactivated = availability::deactivate(&mut conn, &Actor::technician(tech.id), first.id)
        .await
        .expect("deactivate");
    assert!(!deactivated.is_active);

    let reloaded = availability::get_by_id(&mut conn, first.id)
        .await
        .expect("get by id");
    assert!(!reloaded.is_active);
}
