//! Booking reconciliation job.
//!
//! Releases no-shows and completes expired sessions on a fixed tick. A
//! store-level advisory lock makes the cycle a singleton across deployed
//! instances: whoever fails the non-blocking acquire simply skips the
//! tick. Candidates are scanned without locks and then re-checked under
//! the facility and booking row locks, so a user-driven transition racing
//! the cycle always wins.

use chrono::{Duration as ChronoDuration, Utc};
use metrics::counter;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use persistence::db;
use persistence::entities::BookingStatusDb;
use persistence::repositories::{BookingRepository, FacilityRepository};

use super::scheduler::Job;
use super::CleanupStatus;
use crate::broadcast::Broadcaster;
use crate::config::BookingConfig;

/// How far back the "just became active" probe looks.
const JUST_STARTED_WINDOW_SECS: i64 = 60;

/// What one reconciliation cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Another instance held the singleton lock; nothing was scanned.
    pub skipped: bool,
    pub released: u64,
    pub completed: u64,
    pub just_started: bool,
}

impl CycleOutcome {
    /// Whether observers should refetch state.
    pub fn changed(&self) -> bool {
        self.released > 0 || self.completed > 0 || self.just_started
    }
}

/// Periodic no-show / expiry reconciler.
pub struct ReconcileBookingsJob {
    pool: PgPool,
    grace_minutes: i64,
    lock_id: i64,
    interval: Duration,
    broadcaster: Broadcaster,
    status: CleanupStatus,
}

impl ReconcileBookingsJob {
    pub fn new(
        pool: PgPool,
        config: &BookingConfig,
        broadcaster: Broadcaster,
        status: CleanupStatus,
    ) -> Self {
        Self {
            pool,
            grace_minutes: config.no_show_grace_minutes,
            lock_id: config.cleanup_lock_id,
            interval: Duration::from_secs(config.cleanup_interval_secs),
            broadcaster,
            status,
        }
    }

    /// Run one full cycle. Public so tests can drive the reconciler
    /// directly instead of waiting for the tick.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, sqlx::Error> {
        let mut lock_conn = self.pool.acquire().await?;
        if !db::try_advisory_lock(&mut *lock_conn, self.lock_id).await? {
            debug!("Reconciler lock held elsewhere, skipping cycle");
            return Ok(CycleOutcome {
                skipped: true,
                ..CycleOutcome::default()
            });
        }

        // The advisory lock is session-scoped: release it on this same
        // connection whether or not the sweep succeeded.
        let outcome = self.sweep().await;
        let unlock = db::advisory_unlock(&mut *lock_conn, self.lock_id).await;
        drop(lock_conn);
        let outcome = outcome?;
        unlock?;

        if outcome.changed() {
            self.broadcaster.notify();
        }
        self.status.mark_ran(Utc::now());
        Ok(outcome)
    }

    async fn sweep(&self) -> Result<CycleOutcome, sqlx::Error> {
        let repo = BookingRepository::new(self.pool.clone());

        let mut released = 0;
        for (id, facility_id) in repo.no_show_candidates(self.grace_minutes).await? {
            if self.release_no_show(id, facility_id).await? {
                released += 1;
            }
        }

        let mut completed = 0;
        for (id, facility_id) in repo.expired_candidates().await? {
            if self.complete_expired(id, facility_id).await? {
                completed += 1;
            }
        }

        let just_started = repo.any_started_within(JUST_STARTED_WINDOW_SECS).await?;

        if released > 0 {
            counter!("reconciler_no_shows_released").increment(released);
        }
        if completed > 0 {
            counter!("reconciler_sessions_completed").increment(completed);
        }

        Ok(CycleOutcome {
            skipped: false,
            released,
            completed,
            just_started,
        })
    }

    /// Release one no-show candidate, re-checking it under lock. Returns
    /// false when the row changed since the scan (checked in, cancelled, or
    /// already released).
    async fn release_no_show(&self, id: Uuid, facility_id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        db::bound_lock_wait(&mut *tx).await?;
        if FacilityRepository::lock_by_id(&mut *tx, facility_id).await?.is_none() {
            return Ok(false);
        }
        let Some(booking) = BookingRepository::lock_by_id(&mut *tx, id).await? else {
            return Ok(false);
        };
        if booking.status != BookingStatusDb::Scheduled {
            return Ok(false);
        }
        let now = db::current_time(&mut *tx).await?;
        if now <= booking.starts_at + ChronoDuration::minutes(self.grace_minutes) {
            return Ok(false);
        }

        BookingRepository::set_status(&mut *tx, id, BookingStatusDb::Released).await?;
        tx.commit().await?;
        info!(booking_id = %id, facility_id, "Released no-show booking");
        Ok(true)
    }

    /// Complete one expired session, re-checking it under lock.
    async fn complete_expired(&self, id: Uuid, facility_id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        db::bound_lock_wait(&mut *tx).await?;
        if FacilityRepository::lock_by_id(&mut *tx, facility_id).await?.is_none() {
            return Ok(false);
        }
        let Some(booking) = BookingRepository::lock_by_id(&mut *tx, id).await? else {
            return Ok(false);
        };
        if booking.status != BookingStatusDb::CheckedIn {
            return Ok(false);
        }
        let now = db::current_time(&mut *tx).await?;
        if now < booking.ends_at {
            return Ok(false);
        }

        BookingRepository::set_status(&mut *tx, id, BookingStatusDb::Completed).await?;
        tx.commit().await?;
        info!(booking_id = %id, facility_id, "Completed expired session");
        Ok(true)
    }
}

#[async_trait::async_trait]
impl Job for ReconcileBookingsJob {
    fn name(&self) -> &'static str {
        "reconcile_bookings"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) -> anyhow::Result<()> {
        let outcome = self.run_cycle().await?;
        if !outcome.skipped && outcome.changed() {
            info!(
                released = outcome.released,
                completed = outcome.completed,
                just_started = outcome.just_started,
                "Reconciliation cycle applied changes"
            );
        }
        Ok(())
    }
}
