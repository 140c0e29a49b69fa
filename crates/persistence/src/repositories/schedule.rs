//! Per-facility day schedule query.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::entities::ScheduleRowEntity;
use crate::metrics::QueryTimer;

/// Repository for the day-grid schedule view.
#[derive(Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every operational unit of a facility left-joined with its active
    /// bookings intersecting the day. Units without bookings still produce
    /// one row (with NULL booking columns) so the grid shows them empty.
    pub async fn day_grid(
        &self,
        facility_id: i64,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<Vec<ScheduleRowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("schedule_day_grid");
        let result = sqlx::query_as::<_, ScheduleRowEntity>(
            r#"
            SELECT fu.id AS unit_id, fu.unit_name,
                   b.id AS booking_id, b.booked_by, b.user_type, b.club_name,
                   b.booking_type, b.starts_at, b.ends_at, b.status
            FROM facility_units fu
            LEFT JOIN bookings b
                   ON b.unit_id = fu.id
                  AND b.status IN ('scheduled', 'checked_in')
                  AND b.starts_at < $3 AND b.ends_at > $2
            WHERE fu.facility_id = $1 AND fu.is_operational
            ORDER BY fu.unit_name, b.starts_at
            "#,
        )
        .bind(facility_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
