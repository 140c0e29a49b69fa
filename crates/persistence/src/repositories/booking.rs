//! Booking repository for database operations.
//!
//! Pool-bound methods serve plain reads and the reconciler's candidate
//! scans. The associated functions taking a `PgConnection` run inside the
//! booking service's transactions, after the facility row lock is held.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{
    BookingEntity, BookingKindDb, BookingStatusDb, UserBookingEntity, UserTypeDb,
};
use crate::metrics::QueryTimer;

const BOOKING_COLUMNS: &str = "id, facility_id, unit_id, booked_by, user_type, club_name, \
     booking_type, starts_at, ends_at, status, idempotency_key, created_at";

/// Columns for a booking insert.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub facility_id: i64,
    pub unit_id: Option<i64>,
    pub booked_by: String,
    pub user_type: UserTypeDb,
    pub club_name: Option<String>,
    pub booking_type: BookingKindDb,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub idempotency_key: String,
}

/// Repository for booking-related database operations.
#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All bookings of one user, newest first, with facility and unit names
    /// joined.
    pub async fn list_for_user(
        &self,
        user_name: &str,
    ) -> Result<Vec<UserBookingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_bookings_for_user");
        let result = sqlx::query_as::<_, UserBookingEntity>(
            r#"
            SELECT b.id, b.facility_id, f.name AS facility_name,
                   f.category AS facility_category, b.unit_id,
                   fu.unit_name, b.booking_type, b.starts_at, b.ends_at,
                   b.status, b.created_at
            FROM bookings b
            JOIN facilities f ON f.id = b.facility_id
            LEFT JOIN facility_units fu ON fu.id = b.unit_id
            WHERE b.booked_by = $1
            ORDER BY b.starts_at DESC
            "#,
        )
        .bind(user_name)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Scheduled bookings whose grace window has lapsed: candidates for
    /// release by the reconciler. Each is re-checked under lock before the
    /// actual update.
    pub async fn no_show_candidates(
        &self,
        grace_minutes: i64,
    ) -> Result<Vec<(Uuid, i64)>, sqlx::Error> {
        let timer = QueryTimer::new("no_show_candidates");
        let result = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT id, facility_id
            FROM bookings
            WHERE status = 'scheduled'
              AND starts_at < NOW() - make_interval(mins => $1::INT)
            "#,
        )
        .bind(grace_minutes)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Checked-in bookings whose window has ended: candidates for
    /// completion by the reconciler.
    pub async fn expired_candidates(&self) -> Result<Vec<(Uuid, i64)>, sqlx::Error> {
        let timer = QueryTimer::new("expired_candidates");
        let result = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT id, facility_id
            FROM bookings
            WHERE status = 'checked_in' AND ends_at <= NOW()
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Whether any scheduled booking started within the last `seconds`.
    /// A coarse "something just became active" signal for the broadcaster.
    pub async fn any_started_within(&self, seconds: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("any_started_within");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE status = 'scheduled'
                  AND starts_at > NOW() - make_interval(secs => $1::INT)
                  AND starts_at <= NOW()
            )
            "#,
        )
        .bind(seconds)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    // ── Transaction-scoped operations ────────────────────────────────

    /// The facility a booking belongs to, read without locking. The caller
    /// uses it to lock the facility row before re-reading the booking under
    /// lock.
    pub async fn facility_of(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT facility_id FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Lock a booking row for the duration of the enclosing transaction.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<BookingEntity>, sqlx::Error> {
        sqlx::query_as::<_, BookingEntity>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// First active full-day booking on a facility intersecting the window.
    pub async fn find_full_day_on_facility(
        conn: &mut PgConnection,
        facility_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Option<BookingEntity>, sqlx::Error> {
        sqlx::query_as::<_, BookingEntity>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE facility_id = $1
              AND booking_type = 'full_day'
              AND status IN ('scheduled', 'checked_in')
              AND starts_at < $3 AND ends_at > $2
            ORDER BY starts_at
            LIMIT 1
            "#
        ))
        .bind(facility_id)
        .bind(from)
        .bind(until)
        .fetch_optional(conn)
        .await
    }

    /// First active booking of any kind on a facility intersecting the
    /// window.
    pub async fn find_active_on_facility(
        conn: &mut PgConnection,
        facility_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Option<BookingEntity>, sqlx::Error> {
        sqlx::query_as::<_, BookingEntity>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE facility_id = $1
              AND status IN ('scheduled', 'checked_in')
              AND starts_at < $3 AND ends_at > $2
            ORDER BY starts_at
            LIMIT 1
            "#
        ))
        .bind(facility_id)
        .bind(from)
        .bind(until)
        .fetch_optional(conn)
        .await
    }

    /// First active booking on a unit intersecting the window.
    pub async fn find_active_on_unit(
        conn: &mut PgConnection,
        unit_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Option<BookingEntity>, sqlx::Error> {
        sqlx::query_as::<_, BookingEntity>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE unit_id = $1
              AND status IN ('scheduled', 'checked_in')
              AND starts_at < $3 AND ends_at > $2
            ORDER BY starts_at
            LIMIT 1
            "#
        ))
        .bind(unit_id)
        .bind(from)
        .bind(until)
        .fetch_optional(conn)
        .await
    }

    /// First active booking held by `user_name` intersecting the window,
    /// anywhere.
    pub async fn find_active_for_user(
        conn: &mut PgConnection,
        user_name: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Option<BookingEntity>, sqlx::Error> {
        sqlx::query_as::<_, BookingEntity>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE booked_by = $1
              AND status IN ('scheduled', 'checked_in')
              AND starts_at < $3 AND ends_at > $2
            ORDER BY starts_at
            LIMIT 1
            "#
        ))
        .bind(user_name)
        .bind(from)
        .bind(until)
        .fetch_optional(conn)
        .await
    }

    /// Number of active bookings on a pooled facility intersecting the
    /// window.
    pub async fn count_active_on_facility(
        conn: &mut PgConnection,
        facility_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE facility_id = $1
              AND status IN ('scheduled', 'checked_in')
              AND starts_at < $3 AND ends_at > $2
            "#,
        )
        .bind(facility_id)
        .bind(from)
        .bind(until)
        .fetch_one(conn)
        .await
    }

    /// Insert a new scheduled booking. A unique violation on the active
    /// idempotency index surfaces as `sqlx::Error::Database` with code
    /// 23505 and is remapped to a conflict by the API layer.
    pub async fn insert(
        conn: &mut PgConnection,
        booking: &NewBooking,
    ) -> Result<BookingEntity, sqlx::Error> {
        sqlx::query_as::<_, BookingEntity>(&format!(
            r#"
            INSERT INTO bookings (facility_id, unit_id, booked_by, user_type,
                                  club_name, booking_type, starts_at, ends_at,
                                  idempotency_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking.facility_id)
        .bind(booking.unit_id)
        .bind(&booking.booked_by)
        .bind(booking.user_type)
        .bind(&booking.club_name)
        .bind(booking.booking_type)
        .bind(booking.starts_at)
        .bind(booking.ends_at)
        .bind(&booking.idempotency_key)
        .fetch_one(conn)
        .await
    }

    /// Move a booking to a new status.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: Uuid,
        status: BookingStatusDb,
    ) -> Result<BookingEntity, sqlx::Error> {
        sqlx::query_as::<_, BookingEntity>(&format!(
            "UPDATE bookings SET status = $2 WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_one(conn)
        .await
    }

    /// Complete a booking at check-out, rewriting `ends_at` to the snapped
    /// boundary.
    pub async fn complete_at(
        conn: &mut PgConnection,
        id: Uuid,
        ends_at: DateTime<Utc>,
    ) -> Result<BookingEntity, sqlx::Error> {
        sqlx::query_as::<_, BookingEntity>(&format!(
            r#"
            UPDATE bookings SET status = 'completed', ends_at = $2
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(ends_at)
        .fetch_one(conn)
        .await
    }
}
