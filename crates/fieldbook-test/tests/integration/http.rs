//! Integration tests for the HTTP surface: identity headers, status mapping
//! and a booking flow driven end to end through the router.

use chrono::SecondsFormat;
use salvo::http::StatusCode;
use serde_json::json;

use fieldbook_core::types::Role;
use fieldbook_service::identity::Actor;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn healthcheck_is_public() {
    let service = create_test_service();
    let response = TestRequest::get("/api/app/healthcheck")
        .send(&service)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.body, "OK");
}

#[test_log::test(tokio::test)]
async fn readiness_needs_a_database() {
    let service = create_test_service();
    TestRequest::get("/api/app/readiness")
        .send(&service)
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[test_log::test(tokio::test)]
async fn readiness_checks_out_a_connection() {
    let db = require_db!();
    let service = create_db_test_service(&db);
    let response = TestRequest::get("/api/app/readiness")
        .send(&service)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.body, "READY");
}

#[test_log::test(tokio::test)]
async fn whoami_echoes_gateway_identity() {
    let service = create_test_service();
    let actor = Actor::technician(uuid::Uuid::now_v7());

    let body = TestRequest::get("/api/app/whoami")
        .actor(&actor)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["id"], actor.id.to_string());
    assert_eq!(body["role"], "technician");
}

#[test_log::test(tokio::test)]
async fn anonymous_and_malformed_identities_are_rejected() {
    let service = create_test_service();

    let body = TestRequest::get("/api/app/whoami")
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .json();
    assert_eq!(body["error"], "not_authenticated");

    TestRequest::get("/api/app/whoami")
        .header("x-user-id", "not-a-uuid")
        .header("x-user-role", "customer")
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    TestRequest::get("/api/app/whoami")
        .header("x-user-id", &uuid::Uuid::now_v7().to_string())
        .header("x-user-role", "root")
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    TestRequest::post("/api/schedules")
        .json(&json!({ "date": "2030-01-01" }))
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn malformed_bodies_and_ids_are_bad_requests() {
    let service = create_test_service();
    let actor = Actor::technician(uuid::Uuid::now_v7());

    let body = TestRequest::post("/api/schedules")
        .actor(&actor)
        .json(&json!({ "date": "not-a-date" }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(body["error"], "bad_request");
    assert_eq!(body["retryable"], false);

    TestRequest::post("/api/requests/not-a-uuid/accept")
        .actor(&actor)
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
#[expect(clippy::too_many_lines)]
async fn booking_flow_over_http() {
    let db = require_db!();
    let service = create_db_test_service(&db);
    let admin = Actor::new(uuid::Uuid::now_v7(), Role::Admin);
    let technician = Actor::technician(uuid::Uuid::now_v7());
    let customer = Actor::customer(uuid::Uuid::now_v7());
    let rival = Actor::customer(uuid::Uuid::now_v7());
    let service_id = uuid::Uuid::now_v7();
    let date = future_date(60);
    let ten = slot_at(date, 10);

    // Publishing before verification is refused.
    let publish_body = json!({
        "date": date,
        "address": { "line1": "1 Workshop Way", "city": "Chicago" },
        "coordinates": ORIGIN,
    });
    let body = TestRequest::post("/api/schedules")
        .actor(&technician)
        .json(&publish_body)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .json();
    assert_eq!(body["error"], "not_approved");

    TestRequest::put(&format!("/api/technicians/{}", technician.id))
        .actor(&technician)
        .json(&json!({ "service_id": service_id, "display_name": "Pat", "is_approved": true }))
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    TestRequest::put(&format!("/api/technicians/{}", technician.id))
        .actor(&admin)
        .json(&json!({ "service_id": service_id, "display_name": "Pat", "is_approved": true }))
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    let schedule = TestRequest::post("/api/schedules")
        .actor(&technician)
        .json(&publish_body)
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(schedule["slots"].as_array().map(Vec::len), Some(9));
    let schedule_id = schedule["id"].as_str().expect("schedule id").to_string();

    let body = TestRequest::post("/api/schedules")
        .actor(&technician)
        .json(&publish_body)
        .send(&service)
        .await
        .assert_status(StatusCode::CONFLICT)
        .json();
    assert_eq!(body["error"], "already_exists");

    TestRequest::get(&format!("/api/schedules/{}/{date}", technician.id))
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    let time = ten.to_rfc3339_opts(SecondsFormat::Secs, true);
    let found = TestRequest::get(&format!(
        "/api/slots?service_id={service_id}&latitude={}&longitude={}&date={date}&time={time}",
        ORIGIN[1], ORIGIN[0]
    ))
    .send(&service)
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert_eq!(found.as_array().map(Vec::len), Some(1));
    assert_eq!(found[0]["technician_id"], technician.id.to_string());

    let request_body = json!({
        "technician_id": technician.id,
        "schedule_id": schedule_id,
        "time": ten,
        "date": date,
        "address": { "line1": "42 Customer Ct", "city": "Chicago" },
        "description": "Boiler makes a knocking sound",
    });
    let request = TestRequest::post("/api/requests")
        .actor(&customer)
        .json(&request_body)
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let body = TestRequest::post("/api/requests")
        .actor(&customer)
        .json(&request_body)
        .send(&service)
        .await
        .assert_status(StatusCode::CONFLICT)
        .json();
    assert_eq!(body["error"], "duplicate_request");
    let rival_request = TestRequest::post("/api/requests")
        .actor(&rival)
        .json(&request_body)
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    let pending = TestRequest::get("/api/requests/pending")
        .actor(&technician)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(pending.as_array().map(Vec::len), Some(2));

    let request_id = request["id"].as_str().expect("request id");
    let promotion = TestRequest::post(&format!("/api/requests/{request_id}/accept"))
        .actor(&technician)
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(promotion["booking"]["status"], "confirmed");
    assert_eq!(promotion["cancelled_request_ids"][0], rival_request["id"]);

    let rival_id = rival_request["id"].as_str().expect("request id");
    let body = TestRequest::post(&format!("/api/requests/{rival_id}/accept"))
        .actor(&technician)
        .send(&service)
        .await
        .assert_status(StatusCode::CONFLICT)
        .json();
    assert_eq!(body["error"], "slot_already_taken");

    let bookings = TestRequest::get("/api/bookings?status=confirmed")
        .actor(&customer)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(bookings.as_array().map(Vec::len), Some(1));
    let booking_id = promotion["booking"]["id"].as_str().expect("booking id");

    TestRequest::get(&format!("/api/bookings/{booking_id}"))
        .actor(&rival)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let settlement = TestRequest::post(&format!("/api/bookings/{booking_id}/payment"))
        .actor(&technician)
        .json(&json!({ "amount": 99, "mode": "cash" }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(settlement["payment"]["site_fee"], 10);
    assert_eq!(settlement["booking"]["status"], "completed");

    TestRequest::post(&format!("/api/bookings/{booking_id}/cancel"))
        .actor(&customer)
        .send(&service)
        .await
        .assert_status(StatusCode::CONFLICT);

    let review = TestRequest::post(&format!("/api/bookings/{booking_id}/review"))
        .actor(&customer)
        .json(&json!({ "rating": 4 }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(review["rating"], 4);

    let body = TestRequest::post(&format!("/api/bookings/{booking_id}/review"))
        .actor(&customer)
        .json(&json!({ "rating": 5 }))
        .send(&service)
        .await
        .assert_status(StatusCode::CONFLICT)
        .json();
    assert_eq!(body["error"], "review_already_exists");
}

#[test_log::test(tokio::test)]
async fn cancellation_and_online_payment_over_http() {
    let db = require_db!();
    let service = create_db_test_service(&db);
    let tech = db.seed_technician(true).await.expect("seed technician");
    let technician = Actor::technician(tech.id);
    let customer = Actor::customer(uuid::Uuid::now_v7());

    let first_day = db.publish(tech.id, future_date(61), ORIGIN).await.expect("publish");
    let second_day = db.publish(tech.id, future_date(62), ORIGIN).await.expect("publish");
    let cancelled_request = db
        .submit(customer.id, &first_day, slot_at(first_day.date, 9))
        .await
        .expect("request");
    let paid_request = db
        .submit(customer.id, &second_day, slot_at(second_day.date, 9))
        .await
        .expect("request");

    let mut booking_ids = Vec::new();
    for request_id in [cancelled_request.id, paid_request.id] {
        let promotion = TestRequest::post(&format!("/api/requests/{request_id}/accept"))
            .actor(&technician)
            .send(&service)
            .await
            .assert_status(StatusCode::CREATED)
            .json();
        booking_ids.push(promotion["booking"]["id"].as_str().expect("booking id").to_string());
    }

    let cancelled = TestRequest::post(&format!("/api/bookings/{}/cancel", booking_ids[0]))
        .actor(&technician)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(cancelled["status"], "cancelled");

    let started = TestRequest::post(&format!("/api/bookings/{}/payment", booking_ids[1]))
        .actor(&technician)
        .json(&json!({ "amount": 150, "mode": "online" }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(started["payment"]["status"], "pending");
    assert!(started["payment"]["client_secret"].is_string());

    let payment_id = started["payment"]["id"].as_str().expect("payment id");
    let confirmed = TestRequest::post(&format!("/api/payments/{payment_id}/confirm"))
        .actor(&customer)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(confirmed["payment"]["status"], "completed");
    assert_eq!(confirmed["payment"]["site_fee"], 15);
    assert_eq!(confirmed["booking"]["status"], "completed");

    TestRequest::post(&format!("/api/payments/{}/confirm", uuid::Uuid::now_v7()))
        .actor(&customer)
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
