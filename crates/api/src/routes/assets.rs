//! Availability endpoint handlers.

use axum::{extract::Query, extract::State, Json};
use persistence::entities::AssetEntity;
use persistence::repositories::AvailabilityRepository;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::facility::CLUB_ONLY_CATEGORY;
use domain::models::{AssetResponse, ListAssetsQuery, UserType};

/// Live availability across all visible facilities.
///
/// GET /api/v1/assets?userName=&userType=
pub async fn list_assets(
    State(state): State<AppState>,
    Query(query): Query<ListAssetsQuery>,
) -> Result<Json<Vec<AssetResponse>>, ApiError> {
    let include_club_only = query.user_type == Some(UserType::Club);
    let repo = AvailabilityRepository::new(state.pool.clone());
    let entities = repo
        .project(
            query.user_name.as_deref(),
            include_club_only,
            CLUB_ONLY_CATEGORY,
        )
        .await?;

    Ok(Json(entities.into_iter().map(asset_response).collect()))
}

fn asset_response(entity: AssetEntity) -> AssetResponse {
    let available_capacity = (entity.total_capacity - entity.current_usage).max(0);
    let current_status = if available_capacity > 0 {
        "available"
    } else {
        "in_use"
    };
    AssetResponse {
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
        current_usage: entity.current_usage,
        available_capacity,
        current_status: current_status.to_string(),
        my_active_booking: entity.my_active_booking,
        active_occupants: entity.active_occupants,
    }
}
