//! siteaudit-server entry point.
//!
//! Loads configuration, assembles the cache tiers and the audit service,
//! starts the maintenance timers and serves the HTTP API until ctrl-c.
//! Logs are JSON on stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use siteaudit_core::{AppConfig, CacheMaintenance, MaintenanceSchedule, SystemClock};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod app;
mod error;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let service = siteaudit_client::build_service(&config, Arc::new(SystemClock)).await?;
    let maintenance = CacheMaintenance::start(service.cache().clone(), MaintenanceSchedule::from_config(&config));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "Starting siteaudit server");

    axum::serve(listener, app::router(app::AppState { service }))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    maintenance.stop().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
