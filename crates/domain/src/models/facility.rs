//! Facility domain models and availability projection DTOs.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::booking::UserType;

/// Category whose facilities are visible to club callers only.
pub const CLUB_ONLY_CATEGORY: &str = "Event Space";

/// A bookable resource class (study hall, court block, event space).
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    /// Concurrent-booking ceiling for pooled facilities; unit count otherwise.
    pub total_capacity: i32,
    pub is_pooled: bool,
    pub min_duration_minutes: i32,
    pub max_duration_minutes: i32,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    /// Advisory label only; instants are compared on their UTC wall clock.
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

/// A sub-unit of a non-pooled facility (one court, one room).
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityUnit {
    pub id: i64,
    pub facility_id: i64,
    pub unit_name: String,
    pub is_operational: bool,
    pub created_at: DateTime<Utc>,
}

/// Query parameters for the availability listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAssetsQuery {
    pub user_name: Option<String>,
    pub user_type: Option<UserType>,
}

/// One facility in the availability projection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponse {
    pub id: i64,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub total_capacity: i32,
    pub is_pooled: bool,
    pub min_duration_minutes: i32,
    pub max_duration_minutes: i32,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub current_usage: i32,
    pub available_capacity: i32,
    pub current_status: String,
    /// The caller's next active booking on this facility, if any.
    pub my_active_booking: Option<serde_json::Value>,
    /// Bookings active at the current instant, with unit names joined.
    pub active_occupants: serde_json::Value,
}

/// One unit in the unit listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitResponse {
    pub id: i64,
    pub unit_name: String,
    pub is_operational: bool,
}

impl From<FacilityUnit> for UnitResponse {
    fn from(unit: FacilityUnit) -> Self {
        Self {
            id: unit.id,
            unit_name: unit.unit_name,
            is_operational: unit.is_operational,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_response_from_unit() {
        let unit = FacilityUnit {
            id: 10,
            facility_id: 2,
            unit_name: "Court A".to_string(),
            is_operational: true,
            created_at: Utc::now(),
        };
        let response: UnitResponse = unit.into();
        assert_eq!(response.id, 10);
        assert_eq!(response.unit_name, "Court A");
        assert!(response.is_operational);
    }

    #[test]
    fn list_assets_query_deserializes_camel_case() {
        let query: ListAssetsQuery =
            serde_json::from_str(r#"{"userName":"alice","userType":"individual"}"#).unwrap();
        assert_eq!(query.user_name.as_deref(), Some("alice"));
        assert_eq!(query.user_type, Some(UserType::Individual));
    }

    #[test]
    fn list_assets_query_fields_optional() {
        let query: ListAssetsQuery = serde_json::from_str("{}").unwrap();
        assert!(query.user_name.is_none());
        assert!(query.user_type.is_none());
    }
}
