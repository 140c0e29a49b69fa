//! Schedule grid row (unit left-joined with its day's bookings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::entities::booking::{BookingKindDb, BookingStatusDb, UserTypeDb};

/// One row of the day-grid query. Booking columns are NULL for operational
/// units with no bookings on the requested day.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduleRowEntity {
    pub unit_id: i64,
    pub unit_name: String,
    pub booking_id: Option<Uuid>,
    pub booked_by: Option<String>,
    pub user_type: Option<UserTypeDb>,
    pub club_name: Option<String>,
    pub booking_type: Option<BookingKindDb>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub status: Option<BookingStatusDb>,
}
