//! Background job scheduler and job implementations.

mod pool_metrics;
mod reconcile_bookings;
mod scheduler;

pub use pool_metrics::PoolMetricsJob;
pub use reconcile_bookings::{CycleOutcome, ReconcileBookingsJob};
pub use scheduler::{Job, JobScheduler};

use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

/// Single-writer, many-reader record of the reconciler's last completed
/// cycle, surfaced by the health endpoint.
#[derive(Debug, Clone, Default)]
pub struct CleanupStatus {
    last_run: Arc<RwLock<Option<DateTime<Utc>>>>,
}

impl CleanupStatus {
    pub fn mark_ran(&self, at: DateTime<Utc>) {
        *self.last_run.write().expect("cleanup status lock poisoned") = Some(at);
    }

    pub fn last_run(&self) -> Option<DateTime<Utc>> {
        *self.last_run.read().expect("cleanup status lock poisoned")
    }
}
