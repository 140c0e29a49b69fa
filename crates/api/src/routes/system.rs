//! System endpoint handlers: health and seeding.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use persistence::repositories::SeedRepository;
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub database: DatabaseHealth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_cleanup_run_at: Option<DateTime<Utc>>,
    pub server_time: DateTime<Utc>,
}

/// Database health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
}

/// Health of the service: store connectivity, the reconciler's last
/// completed run, and the store's clock.
///
/// GET /api/v1/system/health
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let start = std::time::Instant::now();
    let server_time: DateTime<Utc> = sqlx::query_scalar("SELECT NOW()")
        .fetch_one(&state.pool)
        .await
        .map_err(|e| ApiError::ServiceUnavailable(format!("Database unreachable: {}", e)))?;
    let latency_ms = start.elapsed().as_millis() as u64;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        database: DatabaseHealth {
            connected: true,
            latency_ms,
        },
        last_cleanup_run_at: state.cleanup.last_run(),
        server_time,
    }))
}

/// Apply the idempotent demo catalog.
///
/// POST /api/v1/system/seed
pub async fn seed(State(state): State<AppState>) -> Result<Json<SeedResponse>, ApiError> {
    let repo = SeedRepository::new(state.pool.clone());
    repo.seed_demo_catalog().await?;
    tracing::info!("Demo catalog seeded");
    Ok(Json(SeedResponse {
        message: "Seed data applied".to_string(),
    }))
}
