//! Facility repository for database operations.

use sqlx::{PgConnection, PgPool};

use crate::entities::FacilityEntity;
use crate::metrics::QueryTimer;

const FACILITY_COLUMNS: &str = "id, name, category, description, total_capacity, is_pooled, \
     min_duration_minutes, max_duration_minutes, open_time, close_time, timezone, created_at";

/// Repository for facility-related database operations.
#[derive(Clone)]
pub struct FacilityRepository {
    pool: PgPool,
}

impl FacilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a facility by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<FacilityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_facility_by_id");
        let result = sqlx::query_as::<_, FacilityEntity>(&format!(
            "SELECT {FACILITY_COLUMNS} FROM facilities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Lock a facility row for the duration of the enclosing transaction.
    ///
    /// Every booking mutation takes this lock first; the consistent
    /// facility -> unit -> booking order is what keeps concurrent writers
    /// on one facility from deadlocking.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<FacilityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_facility");
        let result = sqlx::query_as::<_, FacilityEntity>(&format!(
            "SELECT {FACILITY_COLUMNS} FROM facilities WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }
}
