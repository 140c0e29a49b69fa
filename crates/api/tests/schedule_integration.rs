//! Integration tests for the per-facility day schedule.
//!
//! Requires a PostgreSQL database reachable via `TEST_DATABASE_URL`.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use tower::ServiceExt;

use common::*;

async fn fetch_schedule(
    app: &axum::Router,
    facility_id: i64,
    date: &str,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/facilities/{facility_id}/schedule?date={date}"
        )))
        .await
        .unwrap();
    let status = response.status();
    (status, parse_response_body(response).await)
}

fn tomorrow_str() -> String {
    (Utc::now() + Duration::days(1))
        .date_naive()
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::test]
async fn grid_includes_units_without_bookings() {
    let pool = create_test_pool().await;
    let app = create_test_app(pool.clone());
    let facility_id = create_facility(&pool, &TestFacility::unit_based(2)).await;
    let court_a = create_unit(&pool, facility_id, "Court A").await;
    let court_b = create_unit(&pool, facility_id, "Court B").await;
    let alice = unique_user("alice");

    insert_booking(
        &pool,
        &TestBooking::scheduled(
            facility_id,
            Some(court_a),
            &alice,
            tomorrow_at(16),
            tomorrow_at(17),
        ),
    )
    .await;

    let (status, body) = fetch_schedule(&app, facility_id, &tomorrow_str()).await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["date"], tomorrow_str());

    let units = body["units"].as_array().unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0]["unitId"], court_a);
    assert_eq!(units[0]["bookings"].as_array().unwrap().len(), 1);
    assert_eq!(units[0]["bookings"][0]["bookedBy"], alice.as_str());
    assert_eq!(units[1]["unitId"], court_b);
    assert_eq!(units[1]["bookings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn bookings_are_sorted_within_a_unit() {
    let pool = create_test_pool().await;
    let app = create_test_app(pool.clone());
    let facility_id = create_facility(&pool, &TestFacility::unit_based(1)).await;
    let court = create_unit(&pool, facility_id, "Court A").await;

    // Inserted out of order, returned by start time.
    insert_booking(
        &pool,
        &TestBooking::scheduled(
            facility_id,
            Some(court),
            &unique_user("later"),
            tomorrow_at(18),
            tomorrow_at(19),
        ),
    )
    .await;
    insert_booking(
        &pool,
        &TestBooking::scheduled(
            facility_id,
            Some(court),
            &unique_user("earlier"),
            tomorrow_at(9),
            tomorrow_at(10),
        ),
    )
    .await;

    let (status, body) = fetch_schedule(&app, facility_id, &tomorrow_str()).await;
    assert_eq!(status, StatusCode::OK);
    let bookings = body["units"][0]["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 2);
    let first: chrono::DateTime<Utc> = bookings[0]["startsAt"].as_str().unwrap().parse().unwrap();
    let second: chrono::DateTime<Utc> = bookings[1]["startsAt"].as_str().unwrap().parse().unwrap();
    assert!(first < second);
}

#[tokio::test]
async fn released_bookings_are_not_shown() {
    let pool = create_test_pool().await;
    let app = create_test_app(pool.clone());
    let facility_id = create_facility(&pool, &TestFacility::unit_based(1)).await;
    let court = create_unit(&pool, facility_id, "Court A").await;

    let mut booking = TestBooking::scheduled(
        facility_id,
        Some(court),
        &unique_user("quitter"),
        tomorrow_at(16),
        tomorrow_at(17),
    );
    booking.status = "released";
    insert_booking(&pool, &booking).await;

    let (status, body) = fetch_schedule(&app, facility_id, &tomorrow_str()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["units"][0]["bookings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn non_operational_units_are_hidden() {
    let pool = create_test_pool().await;
    let app = create_test_app(pool.clone());
    let facility_id = create_facility(&pool, &TestFacility::unit_based(2)).await;
    let court_a = create_unit(&pool, facility_id, "Court A").await;
    let court_b = create_unit(&pool, facility_id, "Court B").await;
    retire_unit(&pool, court_b).await;

    let (status, body) = fetch_schedule(&app, facility_id, &tomorrow_str()).await;
    assert_eq!(status, StatusCode::OK);
    let units = body["units"].as_array().unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0]["unitId"], court_a);
}

#[tokio::test]
async fn dates_outside_the_horizon_are_forbidden() {
    let pool = create_test_pool().await;
    let app = create_test_app(pool.clone());
    let facility_id = create_facility(&pool, &TestFacility::unit_based(1)).await;
    create_unit(&pool, facility_id, "Court A").await;

    let past = (Utc::now() - Duration::days(1))
        .date_naive()
        .format("%Y-%m-%d")
        .to_string();
    let (status, _) = fetch_schedule(&app, facility_id, &past).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let beyond = (Utc::now() + Duration::days(7))
        .date_naive()
        .format("%Y-%m-%d")
        .to_string();
    let (status, _) = fetch_schedule(&app, facility_id, &beyond).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The last day inside the horizon is still served.
    let edge = (Utc::now() + Duration::days(6))
        .date_naive()
        .format("%Y-%m-%d")
        .to_string();
    let (status, _) = fetch_schedule(&app, facility_id, &edge).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unit_listing_reports_operational_flag() {
    let pool = create_test_pool().await;
    let app = create_test_app(pool.clone());
    let facility_id = create_facility(&pool, &TestFacility::unit_based(2)).await;
    create_unit(&pool, facility_id, "Court A").await;
    let court_b = create_unit(&pool, facility_id, "Court B").await;
    retire_unit(&pool, court_b).await;

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/v1/facilities/{facility_id}/units")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let units = body.as_array().unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0]["unitName"], "Court A");
    assert_eq!(units[0]["isOperational"], true);
    assert_eq!(units[1]["unitName"], "Court B");
    assert_eq!(units[1]["isOperational"], false);
}
