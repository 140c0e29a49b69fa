//! Availability projection row (facility joined with live usage).

use chrono::{DateTime, NaiveTime, Utc};
use sqlx::FromRow;

/// One row of the availability projection: every facility column plus the
/// derived usage count and the JSON sub-documents built by the projection
/// query's correlated subqueries.
#[derive(Debug, Clone, FromRow)]
pub struct AssetEntity {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub total_capacity: i32,
    pub is_pooled: bool,
    pub min_duration_minutes: i32,
    pub max_duration_minutes: i32,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    /// Pooled: count of active bookings covering now. Unit-based: distinct
    /// units occupied now.
    pub current_usage: i32,
    /// The caller's next active booking on this facility, or NULL.
    pub my_active_booking: Option<serde_json::Value>,
    /// JSON array of bookings active at the current instant.
    pub active_occupants: serde_json::Value,
}
