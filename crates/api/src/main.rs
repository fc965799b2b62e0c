use std::net::SocketAddr;

use anyhow::{Context, Result};
use queuematic_api::{app, config, middleware, services};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load().context("Failed to load configuration")?;

    middleware::init_logging(&config.logging);

    info!("Starting Queuematic API v{}", env!("CARGO_PKG_VERSION"));

    middleware::init_metrics().context("Failed to install Prometheus recorder")?;

    let pool = persistence::db::create_pool(&config.database.pool_config())
        .await
        .context("Failed to connect to database")?;

    persistence::db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    services::admin_bootstrap::bootstrap_admin(&pool, &config.bootstrap)
        .await
        .context("Admin bootstrap failed")?;

    let addr = config.socket_addr();
    let app = app::create_app(config, pool).map_err(anyhow::Error::msg)?;

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
