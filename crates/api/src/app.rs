use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::broadcast::Broadcaster;
use crate::config::Config;
use crate::jobs::CleanupStatus;
use crate::middleware::trace_id::trace_id;
use crate::routes::{assets, bookings, facilities, system, ws};
use crate::services::BookingService;
use domain::services::{BookingPolicy, Clock};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub booking: BookingService,
    pub broadcaster: Broadcaster,
    pub cleanup: CleanupStatus,
    pub clock: Arc<dyn Clock>,
}

pub fn create_app(
    config: Config,
    pool: PgPool,
    broadcaster: Broadcaster,
    cleanup: CleanupStatus,
    clock: Arc<dyn Clock>,
) -> Router {
    let config = Arc::new(config);

    let booking = BookingService::new(
        pool.clone(),
        BookingPolicy::new(config.booking.rules()),
        broadcaster.clone(),
        config.booking.registered_clubs.clone(),
    );

    let state = AppState {
        pool,
        config: config.clone(),
        booking,
        broadcaster,
        cleanup,
        clock,
    };

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let api = Router::new()
        .route("/assets", get(assets::list_assets))
        .route("/facilities/:id/units", get(facilities::get_units))
        .route("/facilities/:id/schedule", get(facilities::get_schedule))
        .route("/reserve", post(bookings::reserve))
        .route("/check-in", post(bookings::check_in))
        .route("/check-out", post(bookings::check_out))
        .route("/cancel", post(bookings::cancel))
        .route("/bookings/user/:user_name", get(bookings::list_for_user))
        .route("/system/health", get(system::health))
        .route("/system/seed", post(system::seed))
        .route("/ws", get(ws::live_updates));

    Router::new()
        .nest("/api/v1", api)
        // Probe alias outside the versioned prefix.
        .route("/api/health", get(system::health))
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
