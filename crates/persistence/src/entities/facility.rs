//! Facility entity (database row mapping).

use chrono::{DateTime, NaiveTime, Utc};
use domain::models::Facility;
use sqlx::FromRow;

/// Database row mapping for the facilities table.
#[derive(Debug, Clone, FromRow)]
pub struct FacilityEntity {
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
}

impl From<FacilityEntity> for Facility {
    fn from(entity: FacilityEntity) -> Self {
        Facility {
            id: entity.id,
            name: entity.name,
            category: entity.category,
            description: entity.description,
            total_capacity: entity.total_capacity,
            is_pooled: entity.is_pooled,
            min_duration_minutes: entity.min_duration_minutes,
            max_duration_minutes: entity.max_duration_minutes,
            open_time: entity.open_time,
            close_time: entity.close_time,
            timezone: entity.timezone,
            created_at: entity.created_at,
        }
    }
}
