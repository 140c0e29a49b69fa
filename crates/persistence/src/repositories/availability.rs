//! Live availability projection.

use sqlx::PgPool;

use crate::entities::AssetEntity;
use crate::metrics::QueryTimer;

/// Repository for the availability projection.
#[derive(Clone)]
pub struct AvailabilityRepository {
    pool: PgPool,
}

impl AvailabilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Project every visible facility with its live occupancy, the caller's
    /// next active booking, and the current occupants.
    ///
    /// Deliberately one statement: the derived `live` table counts
    /// occupancy per facility at the store's NOW(), and the two correlated
    /// subqueries assemble the caller's booking and the occupant list as
    /// JSON, so the whole view is read at one consistent snapshot.
    pub async fn project(
        &self,
        caller: Option<&str>,
        include_club_only: bool,
        club_only_category: &str,
    ) -> Result<Vec<AssetEntity>, sqlx::Error> {
        let timer = QueryTimer::new("project_availability");
        let result = sqlx::query_as::<_, AssetEntity>(
            r#"
            SELECT
                f.id, f.name, f.category, f.description, f.total_capacity,
                f.is_pooled, f.min_duration_minutes, f.max_duration_minutes,
                f.open_time, f.close_time, f.timezone, f.created_at,
                (CASE WHEN f.is_pooled THEN COALESCE(live.pooled_count, 0)
                      ELSE COALESCE(live.unit_count, 0) END)::INT AS current_usage,
                (
                    SELECT json_build_object(
                        'id', mb.id, 'facilityId', mb.facility_id,
                        'unitId', mb.unit_id, 'bookedBy', mb.booked_by,
                        'userType', mb.user_type, 'clubName', mb.club_name,
                        'bookingType', mb.booking_type,
                        'startsAt', mb.starts_at, 'endsAt', mb.ends_at,
                        'status', mb.status
                    )
                    FROM bookings mb
                    WHERE $1::TEXT IS NOT NULL
                      AND mb.facility_id = f.id
                      AND mb.booked_by = $1
                      AND mb.status IN ('scheduled', 'checked_in')
                      AND mb.ends_at > NOW()
                    ORDER BY mb.starts_at
                    LIMIT 1
                ) AS my_active_booking,
                (
                    SELECT COALESCE(json_agg(json_build_object(
                        'bookedBy', ob.booked_by, 'userType', ob.user_type,
                        'clubName', ob.club_name, 'unitId', ob.unit_id,
                        'unitName', fu.unit_name,
                        'startsAt', ob.starts_at, 'endsAt', ob.ends_at
                    ) ORDER BY ob.starts_at), '[]'::json)
                    FROM bookings ob
                    LEFT JOIN facility_units fu ON fu.id = ob.unit_id
                    WHERE ob.facility_id = f.id
                      AND ob.status IN ('scheduled', 'checked_in')
                      AND ob.starts_at <= NOW() AND ob.ends_at > NOW()
                ) AS active_occupants
            FROM facilities f
            LEFT JOIN (
                SELECT b.facility_id,
                       COUNT(*) AS pooled_count,
                       COUNT(DISTINCT b.unit_id) AS unit_count
                FROM bookings b
                WHERE b.status IN ('scheduled', 'checked_in')
                  AND b.starts_at <= NOW() AND b.ends_at > NOW()
                GROUP BY b.facility_id
            ) live ON live.facility_id = f.id
            WHERE $2 OR f.category <> $3
            ORDER BY f.category, f.name
            "#,
        )
        .bind(caller)
        .bind(include_club_only)
        .bind(club_only_category)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
