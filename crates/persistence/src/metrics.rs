//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record the duration of a named query.
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    histogram!(
        "db_query_duration_seconds",
        "query" => query_name.to_string()
    )
    .record(duration_secs);
}

/// Record connection pool occupancy gauges. Called periodically by the pool
/// metrics job.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("db_connections_active").set(active as f64);
    gauge!("db_connections_idle").set(idle as f64);
    gauge!("db_connections_total").set(size as f64);
}

/// Times a database operation and records it under the query's name.
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_timer_tracks_name() {
        let timer = QueryTimer::new("list_assets");
        assert_eq!(timer.query_name, "list_assets");
    }
}
