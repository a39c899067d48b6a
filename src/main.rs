//! linkwatch - Radio link status dashboard backend.
//!
//! Fetches the radio-link inventory from a spreadsheet, pings every hop
//! address, and serves per-link health verdicts grouped by POP.

mod cache;
mod config;
mod diagnose;
mod inventory;
mod probe;
mod service;
mod web;

use cache::{StatusCache, SystemClock};
use config::ServerConfig;
use inventory::SheetSource;
use probe::{BulkProber, CommandPinger};
use service::StatusService;
use web::Server;

use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("linkwatch=info".parse()?))
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    tracing::info!("Starting linkwatch on port {}...", cfg.http_port);
    if cfg.sheet.sheet_id.is_empty() {
        tracing::warn!("LINKWATCH_SHEET_ID is not set; status requests will fail");
    }

    // Wire the diagnosis pipeline
    let inventory = Arc::new(SheetSource::new(cfg.sheet.clone()));
    let prober = BulkProber::new(
        Arc::new(CommandPinger),
        cfg.batch_size,
        Duration::from_secs(cfg.ping_timeout_secs),
    );
    let cache = StatusCache::new(Duration::from_secs(cfg.cache_seconds), Arc::new(SystemClock));
    let service = Arc::new(StatusService::new(inventory, prober, cache));

    // Start web server
    let server = Server::new(cfg, service);
    server.start().await?;

    Ok(())
}
