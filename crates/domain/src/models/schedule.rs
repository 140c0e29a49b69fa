//! Per-facility day schedule DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::booking::{BookingStatus, BookingType, UserType};

/// Query parameters for the schedule view.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleQuery {
    pub date: NaiveDate,
}

/// One booking on the schedule grid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBookingItem {
    pub id: Uuid,
    pub booked_by: String,
    pub user_type: UserType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_name: Option<String>,
    pub booking_type: BookingType,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: BookingStatus,
}

/// One unit's bookings for the day. Present even when empty.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSchedule {
    pub unit_id: i64,
    pub unit_name: String,
    pub bookings: Vec<ScheduleBookingItem>,
}

/// The full day grid for a facility.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub date: NaiveDate,
    pub units: Vec<UnitSchedule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_query_parses_iso_date() {
        let query: ScheduleQuery = serde_json::from_str(r#"{"date":"2025-06-02"}"#).unwrap();
        assert_eq!(
            query.date,
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
        );
    }

    #[test]
    fn empty_unit_serializes_with_empty_bookings() {
        let unit = UnitSchedule {
            unit_id: 10,
            unit_name: "Court A".to_string(),
            bookings: vec![],
        };
        let json = serde_json::to_value(&unit).unwrap();
        assert_eq!(json["unitId"], 10);
        assert_eq!(json["bookings"].as_array().unwrap().len(), 0);
    }
}
