//! Booking entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Booking, BookingStatus, BookingType, UserType};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for booking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
pub enum BookingStatusDb {
    Scheduled,
    CheckedIn,
    Completed,
    Released,
}

/// Database enum for the claimant kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "booking_user_type", rename_all = "lowercase")]
pub enum UserTypeDb {
    Individual,
    Club,
}

/// Database enum for the booking classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "booking_kind", rename_all = "snake_case")]
pub enum BookingKindDb {
    TimeBased,
    FullDay,
}

impl From<BookingStatusDb> for BookingStatus {
    fn from(status: BookingStatusDb) -> Self {
        match status {
            BookingStatusDb::Scheduled => BookingStatus::Scheduled,
            BookingStatusDb::CheckedIn => BookingStatus::CheckedIn,
            BookingStatusDb::Completed => BookingStatus::Completed,
            BookingStatusDb::Released => BookingStatus::Released,
        }
    }
}

impl From<BookingStatus> for BookingStatusDb {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Scheduled => BookingStatusDb::Scheduled,
            BookingStatus::CheckedIn => BookingStatusDb::CheckedIn,
            BookingStatus::Completed => BookingStatusDb::Completed,
            BookingStatus::Released => BookingStatusDb::Released,
        }
    }
}

impl From<UserTypeDb> for UserType {
    fn from(user_type: UserTypeDb) -> Self {
        match user_type {
            UserTypeDb::Individual => UserType::Individual,
            UserTypeDb::Club => UserType::Club,
        }
    }
}

impl From<UserType> for UserTypeDb {
    fn from(user_type: UserType) -> Self {
        match user_type {
            UserType::Individual => UserTypeDb::Individual,
            UserType::Club => UserTypeDb::Club,
        }
    }
}

impl From<BookingKindDb> for BookingType {
    fn from(kind: BookingKindDb) -> Self {
        match kind {
            BookingKindDb::TimeBased => BookingType::TimeBased,
            BookingKindDb::FullDay => BookingType::FullDay,
        }
    }
}

impl From<BookingType> for BookingKindDb {
    fn from(kind: BookingType) -> Self {
        match kind {
            BookingType::TimeBased => BookingKindDb::TimeBased,
            BookingType::FullDay => BookingKindDb::FullDay,
        }
    }
}

/// Database row mapping for the bookings table.
#[derive(Debug, Clone, FromRow)]
pub struct BookingEntity {
    pub id: Uuid,
    pub facility_id: i64,
    pub unit_id: Option<i64>,
    pub booked_by: String,
    pub user_type: UserTypeDb,
    pub club_name: Option<String>,
    pub booking_type: BookingKindDb,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: BookingStatusDb,
    pub idempotency_key: String,
    pub created_at: DateTime<Utc>,
}

impl From<BookingEntity> for Booking {
    fn from(entity: BookingEntity) -> Self {
        Booking {
            id: entity.id,
            facility_id: entity.facility_id,
            unit_id: entity.unit_id,
            booked_by: entity.booked_by,
            user_type: entity.user_type.into(),
            club_name: entity.club_name,
            booking_type: entity.booking_type.into(),
            starts_at: entity.starts_at,
            ends_at: entity.ends_at,
            status: entity.status.into(),
            idempotency_key: entity.idempotency_key,
            created_at: entity.created_at,
        }
    }
}

/// Booking row joined with facility and unit names, for the per-user listing.
#[derive(Debug, Clone, FromRow)]
pub struct UserBookingEntity {
    pub id: Uuid,
    pub facility_id: i64,
    pub facility_name: String,
    pub facility_category: String,
    pub unit_id: Option<i64>,
    pub unit_name: Option<String>,
    pub booking_type: BookingKindDb,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: BookingStatusDb,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrips_through_db_enum() {
        for status in [
            BookingStatus::Scheduled,
            BookingStatus::CheckedIn,
            BookingStatus::Completed,
            BookingStatus::Released,
        ] {
            let db: BookingStatusDb = status.into();
            let back: BookingStatus = db.into();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn user_type_roundtrips_through_db_enum() {
        for user_type in [UserType::Individual, UserType::Club] {
            let db: UserTypeDb = user_type.into();
            let back: UserType = db.into();
            assert_eq!(back, user_type);
        }
    }

    #[test]
    fn kind_roundtrips_through_db_enum() {
        for kind in [BookingType::TimeBased, BookingType::FullDay] {
            let db: BookingKindDb = kind.into();
            let back: BookingType = db.into();
            assert_eq!(back, kind);
        }
    }
}
