//! Facility unit repository for database operations.

use sqlx::{PgConnection, PgPool};

use crate::entities::FacilityUnitEntity;
use crate::metrics::QueryTimer;

const UNIT_COLUMNS: &str = "id, facility_id, unit_name, is_operational, created_at";

/// Repository for facility-unit database operations.
#[derive(Clone)]
pub struct FacilityUnitRepository {
    pool: PgPool,
}

impl FacilityUnitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all units of a facility, alphabetically.
    pub async fn list_for_facility(
        &self,
        facility_id: i64,
    ) -> Result<Vec<FacilityUnitEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_units_for_facility");
        let result = sqlx::query_as::<_, FacilityUnitEntity>(&format!(
            "SELECT {UNIT_COLUMNS} FROM facility_units WHERE facility_id = $1 ORDER BY unit_name"
        ))
        .bind(facility_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Lock a unit row for the duration of the enclosing transaction.
    /// Taken after the facility lock, never before.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<FacilityUnitEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_facility_unit");
        let result = sqlx::query_as::<_, FacilityUnitEntity>(&format!(
            "SELECT {UNIT_COLUMNS} FROM facility_units WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }
}
