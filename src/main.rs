//! Siteward - Website Status Monitor
//!
//! Periodically probes a fixed set of HTTP endpoints, records reachability
//! and latency, and serves current status and 24-hour uptime over a JSON API.

mod config;
mod db;
mod monitor;
mod probe;
mod scheduler;
mod status;
mod web;

#[cfg(test)]
mod testing;

use config::ServerConfig;
use db::{CheckStore, Store};
use monitor::Monitor;
use scheduler::RetentionManager;
use web::Server;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // A missing .env file is fine; the environment still applies.
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("siteward=info".parse()?))
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    tracing::info!("Starting Siteward on port {}...", cfg.http_port);
    tracing::info!("Using database at {}", cfg.db_path);
    for target in &cfg.targets {
        tracing::info!("Monitoring {} ({})", target.name, target.url);
    }

    // Initialize database
    let store: Arc<dyn CheckStore> = Arc::new(Store::new(&cfg.db_path)?);
    tracing::info!("Database initialized successfully");

    let monitor = Arc::new(Monitor::from_config(&cfg, store.clone())?);
    let retention = RetentionManager::new(store.clone(), cfg.retention_days);

    monitor.scheduler().start().await;
    retention.start().await;

    let server = Server::new(cfg.http_port, monitor.clone());
    let served = server.start(shutdown_signal()).await;

    // Background work must finish before the store goes away.
    monitor.scheduler().stop().await;
    retention.stop().await;
    drop(monitor);
    drop(store);
    tracing::info!("Shutdown complete");

    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
