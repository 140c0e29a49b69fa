//! Demo dataset seeding.

use sqlx::PgPool;

use crate::metrics::QueryTimer;

/// Seeds the demo facility catalog. Idempotent: rows are upserted on their
/// explicit ids so repeated seeding converges to the same catalog.
#[derive(Clone)]
pub struct SeedRepository {
    pool: PgPool,
}

impl SeedRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn seed_demo_catalog(&self) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("seed_demo_catalog");

        sqlx::query(
            r#"
            INSERT INTO facilities
                (id, name, category, description, total_capacity, is_pooled,
                 min_duration_minutes, max_duration_minutes, open_time, close_time, timezone)
            VALUES
                (1, 'Quiet Study Hall', 'Study Spaces', 'Silent individual study seats',
                 40, TRUE, 30, 240, '08:00', '22:00', 'UTC'),
                (2, 'Courts', 'Sports', 'Indoor multi-sport courts',
                 3, FALSE, 30, 120, '07:00', '23:00', 'UTC'),
                (3, 'Swim Lanes', 'Sports', 'Lap pool lanes',
                 8, TRUE, 30, 90, '06:00', '21:00', 'UTC'),
                (4, 'Music Rooms', 'Study Spaces', 'Soundproofed practice rooms',
                 2, FALSE, 30, 120, '09:00', '21:00', 'UTC'),
                (5, 'Main Auditorium', 'Event Space', 'Stage and seating for 400',
                 1, FALSE, 60, 600, '07:00', '23:30', 'UTC')
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                category = EXCLUDED.category,
                description = EXCLUDED.description,
                total_capacity = EXCLUDED.total_capacity,
                is_pooled = EXCLUDED.is_pooled,
                min_duration_minutes = EXCLUDED.min_duration_minutes,
                max_duration_minutes = EXCLUDED.max_duration_minutes,
                open_time = EXCLUDED.open_time,
                close_time = EXCLUDED.close_time,
                timezone = EXCLUDED.timezone
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO facility_units (id, facility_id, unit_name)
            VALUES
                (10, 2, 'Court A'), (11, 2, 'Court B'), (12, 2, 'Court C'),
                (20, 4, 'Room 1'), (21, 4, 'Room 2'),
                (50, 5, 'Main Hall')
            ON CONFLICT (id) DO UPDATE SET
                facility_id = EXCLUDED.facility_id,
                unit_name = EXCLUDED.unit_name
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Keep generated ids clear of the seeded range.
        sqlx::query("SELECT setval('facilities_id_seq', 100, true)")
            .execute(&self.pool)
            .await?;
        sqlx::query("SELECT setval('facility_units_id_seq', 100, true)")
            .execute(&self.pool)
            .await?;

        timer.record();
        Ok(())
    }
}
