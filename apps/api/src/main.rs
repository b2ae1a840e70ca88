//! Haven API server entry point.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use haven_api::config::GatewayKind;
use haven_api::{create_app, ApiConfig, AppState};
use haven_booking::{InMemoryGateway, PaymentGateway, PaymobClient};
use haven_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,haven=debug")))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    info!("Starting Haven API server...");

    let config = ApiConfig::load().context("loading configuration")?;
    info!(
        addr = %config.addr(),
        database = %config.database_path,
        gateway = ?config.gateway,
        "Configuration loaded"
    );

    let db = Database::new(
        DbConfig::new(&config.database_path).max_connections(config.db_max_connections),
    )
    .await
    .context("opening database")?;

    let gateway: Arc<dyn PaymentGateway> = match config.gateway {
        GatewayKind::Paymob => Arc::new(PaymobClient::new(config.paymob.clone())?),
        GatewayKind::Memory => {
            warn!("Using the in-memory payment gateway; no real charges are made");
            Arc::new(InMemoryGateway::new())
        }
    };

    let state = Arc::new(AppState::new(db.clone(), gateway, &config)?);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("binding {}", config.addr()))?;
    info!(addr = %config.addr(), "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
