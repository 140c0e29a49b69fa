use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use booking_api::broadcast::Broadcaster;
use booking_api::jobs::{CleanupStatus, JobScheduler, PoolMetricsJob, ReconcileBookingsJob};
use booking_api::{app, config::Config, middleware::logging};
use domain::services::SystemClock;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    logging::init_logging(&config.logging);

    info!("Starting facility booking API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    let broadcaster = Broadcaster::default();
    let cleanup = CleanupStatus::default();

    let mut scheduler = JobScheduler::new();
    scheduler.register(ReconcileBookingsJob::new(
        pool.clone(),
        &config.booking,
        broadcaster.clone(),
        cleanup.clone(),
    ));
    scheduler.register(PoolMetricsJob::new(pool.clone()));
    scheduler.start();

    let addr = config.socket_addr();
    let app = app::create_app(config, pool, broadcaster, cleanup, Arc::new(SystemClock));

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, draining background jobs");
    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(5)).await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }
}
