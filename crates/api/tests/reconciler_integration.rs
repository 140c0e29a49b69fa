//! Integration tests for the booking reconciler.
//!
//! Requires a PostgreSQL database reachable via `TEST_DATABASE_URL`.

mod common;

use chrono::{Duration, Utc};
use serial_test::serial;

use booking_api::broadcast::Broadcaster;
use booking_api::jobs::{CleanupStatus, CycleOutcome, ReconcileBookingsJob};
use common::*;

fn reconciler(
    pool: sqlx::PgPool,
    broadcaster: Broadcaster,
    status: CleanupStatus,
) -> ReconcileBookingsJob {
    ReconcileBookingsJob::new(pool, &test_booking_config(), broadcaster, status)
}

/// Retry until this test's cycle actually holds the singleton lock;
/// parallel tests in this binary may be inside their own cycle.
async fn run_cycle(job: &ReconcileBookingsJob) -> CycleOutcome {
    loop {
        let outcome = job.run_cycle().await.expect("reconciler cycle failed");
        if !outcome.skipped {
            return outcome;
        }
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;
    }
}

#[tokio::test]
#[serial]
async fn no_shows_are_released() {
    let pool = create_test_pool().await;
    let facility_id = create_facility(&pool, &TestFacility::unit_based(1)).await;
    let court = create_unit(&pool, facility_id, "Court A").await;
    let alice = unique_user("alice");

    // Started 30 minutes ago, never checked in: well past the grace window.
    let booking_id = insert_booking(
        &pool,
        &TestBooking::scheduled(
            facility_id,
            Some(court),
            &alice,
            Utc::now() - Duration::minutes(30),
            Utc::now() + Duration::minutes(30),
        ),
    )
    .await;

    let broadcaster = Broadcaster::default();
    let mut events = broadcaster.subscribe();
    let status = CleanupStatus::default();
    let job = reconciler(pool.clone(), broadcaster, status.clone());

    let outcome = run_cycle(&job).await;

    assert!(outcome.released >= 1);
    assert_eq!(booking_status(&pool, booking_id).await, "released");
    assert!(status.last_run().is_some());
    tokio::time::timeout(std::time::Duration::from_secs(1), events.recv())
        .await
        .expect("reconciler should signal observers")
        .expect("broadcast channel open");
}

#[tokio::test]
#[serial]
async fn expired_sessions_are_completed() {
    let pool = create_test_pool().await;
    let facility_id = create_facility(&pool, &TestFacility::unit_based(1)).await;
    let court = create_unit(&pool, facility_id, "Court A").await;

    let booking_id = insert_booking(
        &pool,
        &TestBooking::scheduled(
            facility_id,
            Some(court),
            &unique_user("sleeper"),
            Utc::now() - Duration::hours(2),
            Utc::now() - Duration::minutes(1),
        )
        .checked_in(),
    )
    .await;

    let job = reconciler(pool.clone(), Broadcaster::default(), CleanupStatus::default());
    let outcome = run_cycle(&job).await;

    assert!(outcome.completed >= 1);
    assert_eq!(booking_status(&pool, booking_id).await, "completed");
}

#[tokio::test]
#[serial]
async fn bookings_inside_grace_are_left_alone() {
    let pool = create_test_pool().await;
    let facility_id = create_facility(&pool, &TestFacility::unit_based(1)).await;
    let court = create_unit(&pool, facility_id, "Court A").await;

    // Five minutes in: the guest can still check in.
    let graced_id = insert_booking(
        &pool,
        &TestBooking::scheduled(
            facility_id,
            Some(court),
            &unique_user("ontime"),
            Utc::now() - Duration::minutes(5),
            Utc::now() + Duration::hours(1),
        ),
    )
    .await;

    let running_id = insert_booking(
        &pool,
        &TestBooking::scheduled(
            facility_id,
            Some(court),
            &unique_user("running"),
            Utc::now() + Duration::hours(2),
            Utc::now() + Duration::hours(3),
        )
        .checked_in(),
    )
    .await;

    let job = reconciler(pool.clone(), Broadcaster::default(), CleanupStatus::default());
    run_cycle(&job).await;

    assert_eq!(booking_status(&pool, graced_id).await, "scheduled");
    assert_eq!(booking_status(&pool, running_id).await, "checked_in");
}

#[tokio::test]
#[serial]
async fn terminal_bookings_are_not_touched() {
    let pool = create_test_pool().await;
    let facility_id = create_facility(&pool, &TestFacility::unit_based(1)).await;
    let court = create_unit(&pool, facility_id, "Court A").await;

    let mut booking = TestBooking::scheduled(
        facility_id,
        Some(court),
        &unique_user("gone"),
        Utc::now() - Duration::hours(2),
        Utc::now() - Duration::hours(1),
    );
    booking.status = "released";
    let booking_id = insert_booking(&pool, &booking).await;

    let job = reconciler(pool.clone(), Broadcaster::default(), CleanupStatus::default());
    run_cycle(&job).await;

    assert_eq!(booking_status(&pool, booking_id).await, "released");
}
