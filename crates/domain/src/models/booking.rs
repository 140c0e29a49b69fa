//! Booking domain models for the reservation lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Scheduled,
    CheckedIn,
    Completed,
    Released,
}

impl BookingStatus {
    /// Active bookings hold capacity; terminal ones do not.
    pub fn is_active(self) -> bool {
        matches!(self, BookingStatus::Scheduled | BookingStatus::CheckedIn)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Scheduled => write!(f, "scheduled"),
            BookingStatus::CheckedIn => write!(f, "checked_in"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Released => write!(f, "released"),
        }
    }
}

/// Who is claiming the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Individual,
    Club,
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserType::Individual => write!(f, "individual"),
            UserType::Club => write!(f, "club"),
        }
    }
}

/// How the claim spans the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    TimeBased,
    FullDay,
}

impl std::fmt::Display for BookingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingType::TimeBased => write!(f, "time_based"),
            BookingType::FullDay => write!(f, "full_day"),
        }
    }
}

/// A time-bound ownership claim on a facility or unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub facility_id: i64,
    /// Null iff the owning facility is pooled.
    pub unit_id: Option<i64>,
    pub booked_by: String,
    pub user_type: UserType,
    pub club_name: Option<String>,
    pub booking_type: BookingType,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub idempotency_key: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for POST /reserve.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub facility_id: i64,
    pub unit_id: Option<i64>,
    #[validate(length(min = 1, max = 120, message = "userName must be 1-120 characters"))]
    pub user_name: String,
    pub user_type: UserType,
    #[validate(length(min = 1, max = 120, message = "clubName must be 1-120 characters"))]
    pub club_name: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Request body for check-in / check-out / cancel.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingActionRequest {
    pub booking_id: Uuid,
    #[validate(length(min = 1, max = 120, message = "userName must be 1-120 characters"))]
    pub user_name: String,
}

/// Booking row as returned over the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: Uuid,
    pub facility_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<i64>,
    pub booked_by: String,
    pub user_type: UserType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_name: Option<String>,
    pub booking_type: BookingType,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            facility_id: booking.facility_id,
            unit_id: booking.unit_id,
            booked_by: booking.booked_by,
            user_type: booking.user_type,
            club_name: booking.club_name,
            booking_type: booking.booking_type,
            starts_at: booking.starts_at,
            ends_at: booking.ends_at,
            status: booking.status,
            created_at: booking.created_at,
        }
    }
}

/// One booking in the per-user listing, with facility and unit names joined.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBookingItem {
    pub id: Uuid,
    pub facility_id: i64,
    pub facility_name: String,
    pub facility_category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,
    pub booking_type: BookingType,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Who holds the slot a rejected request collided with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictDetails {
    pub booked_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_name: Option<String>,
    pub user_type: UserType,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}
