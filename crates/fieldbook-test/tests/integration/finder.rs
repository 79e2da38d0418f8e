//! Integration tests for the proximity slot search.

use chrono::Duration;
use fieldbook_service::allocation;
use fieldbook_service::error::ServiceError;
use fieldbook_service::finder::{self, FindSlots};
use fieldbook_service::identity::Actor;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn find_returns_nearby_available_technicians_nearest_first() {
    let db = require_db!();
    let service_id = uuid::Uuid::now_v7();
    let date = future_date(40);
    let ten = slot_at(date, 10);

    let near = db
        .seed_technician_for(service_id, true)
        .await
        .expect("seed technician");
    let farther = db
        .seed_technician_for(service_id, true)
        .await
        .expect("seed technician");
    let out_of_range = db
        .seed_technician_for(service_id, true)
        .await
        .expect("seed technician");
    let busy = db
        .seed_technician_for(service_id, true)
        .await
        .expect("seed technician");
    let other_service = db.seed_technician(true).await.expect("seed technician");

    db.publish(near.id, date, [ORIGIN[0], ORIGIN[1] + 0.01])
        .await
        .expect("publish near");
    db.publish(farther.id, date, [ORIGIN[0], ORIGIN[1] + 0.05])
        .await
        .expect("publish farther");
    db.publish(out_of_range.id, date, [ORIGIN[0] + 1.0, ORIGIN[1]])
        .await
        .expect("publish far away");
    db.publish(other_service.id, date, ORIGIN)
        .await
        .expect("publish other service");
    let busy_day = db
        .publish(busy.id, date, ORIGIN)
        .await
        .expect("publish busy");

    let request = db
        .submit(uuid::Uuid::now_v7(), &busy_day, ten)
        .await
        .expect("request");
    let mut conn = db.get_conn().await.expect("conn");
    allocation::promote(&mut conn, &Actor::technician(busy.id), request.id)
        .await
        .expect("promote");

    let found = finder::find(
        &mut conn,
        &rules(),
        FindSlots {
            service_id,
            latitude: ORIGIN[1],
            longitude: ORIGIN[0],
            date,
            time: ten,
        },
    )
    .await
    .expect("find");

    let ids: Vec<_> = found.iter().map(|c| c.technician_id).collect();
    assert_eq!(ids, vec![near.id, farther.id]);
    assert!(found[0].distance_km < found[1].distance_km);
    assert!(found.iter().all(|c| c.time == ten && c.date == date));
    assert_eq!(found[0].review_count, 0);

    // The busy technician is still offered at 11:00.
    let at_eleven = finder::find(
        &mut conn,
        &rules(),
        FindSlots {
            service_id,
            latitude: ORIGIN[1],
            longitude: ORIGIN[0],
            date,
            time: slot_at(date, 11),
        },
    )
    .await
    .expect("find");
    assert!(at_eleven.iter().any(|c| c.technician_id == busy.id));
}

#[test_log::test(tokio::test)]
async fn find_skips_unapproved_and_inactive_schedules() {
    let db = require_db!();
    let service_id = uuid::Uuid::now_v7();
    let date = future_date(41);

    let approved = db
        .seed_technician_for(service_id, true)
        .await
        .expect("seed technician");
    let day = db.publish(approved.id, date, ORIGIN).await.expect("publish");

    let mut conn = db.get_conn().await.expect("conn");
    let query = FindSlots {
        service_id,
        latitude: ORIGIN[1],
        longitude: ORIGIN[0],
        date,
        time: slot_at(date, 9),
    };
    assert_eq!(
        finder::find(&mut conn, &rules(), query)
            .await
            .expect("find")
            .len(),
        1
    );

    fieldbook_service::availability::deactivate(&mut conn, &Actor::technician(approved.id), day.id)
        .await
        .expect("deactivate");
    assert!(
        finder::find(&mut conn, &rules(), query)
            .await
            .expect("find")
            .is_empty()
    );
}

#[test_log::test(tokio::test)]
async fn find_rejects_invalid_origin() {
    let db = require_db!();
    let mut conn = db.get_conn().await.expect("conn");
    let date = future_date(42);

    let err = finder::find(
        &mut conn,
        &rules(),
        FindSlots {
            service_id: uuid::Uuid::now_v7(),
            latitude: 95.0,
            longitude: 0.0,
            date,
            time: slot_at(date, 9),
        },
    )
    .await
    .expect_err("latitude out of range");
    assert!(matches!(err, ServiceError::ValidationError(_)), "got {err:?}");
}

#[test_log::test(tokio::test)]
async fn find_off_catalog_time_is_empty() {
    let db = require_db!();
    let service_id = uuid::Uuid::now_v7();
    let date = future_date(43);
    let technician = db
        .seed_technician_for(service_id, true)
        .await
        .expect("seed technician");
    db.publish(technician.id, date, ORIGIN).await.expect("publish");

    let mut conn = db.get_conn().await.expect("conn");
    let half_past = finder::find(
        &mut conn,
        &rules(),
        FindSlots {
            service_id,
            latitude: ORIGIN[1],
            longitude: ORIGIN[0],
            date,
            time: slot_at(date, 10) + Duration::minutes(30),
        },
    )
    .await
    .expect("find");
    assert!(half_past.is_empty());
}
