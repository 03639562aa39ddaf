use std::sync::Arc;
use std::time::Duration;

use energy_meter_api::api::handlers::AppState;
use energy_meter_api::api::routes;
use energy_meter_api::repositories::{ReadingsRepository, SettingsRepository};
use energy_meter_api::services::MeterStateService;
use energy_meter_api::{create_pool, db, Config};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    info!("Configuration loaded");

    let pool = create_pool(&config)?;

    // Relay control must stay available when the database is down, so a
    // failed bootstrap is logged and the server starts anyway.
    match db::init_schema(&pool, config.meter.default_price_per_unit).await {
        Ok(()) => info!("Database schema initialized"),
        Err(e) => warn!("Schema initialization failed, continuing without database: {}", e),
    }

    let settings_store = Arc::new(SettingsRepository::new(pool.clone()));
    let meter = MeterStateService::new(
        settings_store,
        config.meter.default_price_per_unit,
        Duration::from_millis(config.meter.settings_store_timeout_ms),
    );
    let readings = ReadingsRepository::new(pool);

    let app = routes::create_router(AppState { meter, readings });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
