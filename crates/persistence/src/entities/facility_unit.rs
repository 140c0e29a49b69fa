//! Facility unit entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::FacilityUnit;
use sqlx::FromRow;

/// Database row mapping for the facility_units table.
#[derive(Debug, Clone, FromRow)]
pub struct FacilityUnitEntity {
    pub id: i64,
    pub facility_id: i64,
    pub unit_name: String,
    pub is_operational: bool,
    pub created_at: DateTime<Utc>,
}

impl From<FacilityUnitEntity> for FacilityUnit {
    fn from(entity: FacilityUnitEntity) -> Self {
        FacilityUnit {
            id: entity.id,
            facility_id: entity.facility_id,
            unit_name: entity.unit_name,
            is_operational: entity.is_operational,
            created_at: entity.created_at,
        }
    }
}
