use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

use commerce_analytics::api;
use commerce_analytics::clock::SystemClock;
use commerce_analytics::config::{AppConfig, CliArgs};
use commerce_analytics::controller::DataController;
use commerce_analytics::metrics::Metrics;
use commerce_analytics::remote::{HttpRemoteBackend, RemoteBackend};
use commerce_analytics::store::{EntityStore, FileBackend};
use commerce_analytics::telemetry;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO, override with RUST_LOG
    telemetry::init();

    let config = AppConfig::from_args(CliArgs::parse())?;
    tracing::info!("🚀 Starting commerce analytics service");

    // === 1. Metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 2. Local store ===
    let store = EntityStore::open(Box::new(FileBackend::new(&config.data_file)), Arc::new(SystemClock))
        .with_context(|| format!("failed to open local store at {}", config.data_file.display()))?;

    // === 3. Remote backend (optional) ===
    let remote = match &config.remote_url {
        Some(url) => {
            let backend: Arc<dyn RemoteBackend> = Arc::new(HttpRemoteBackend::new(url, config.remote_timeout)?);
            tracing::info!(url = %url, timeout_secs = config.remote_timeout.as_secs(), "Remote backend configured");
            Some(backend)
        }
        None => {
            tracing::info!("No remote base URL configured");
            None
        }
    };

    // === 4. Controller ===
    let controller = web::Data::new(DataController::new(
        store,
        remote,
        config.mode_override,
        config.calendar,
        metrics.clone(),
    )?);
    let metrics = web::Data::new(metrics);

    // === 5. HTTP server ===
    tracing::info!(bind = %config.bind, "🌐 Serving HTTP API");
    HttpServer::new(move || {
        App::new()
            .app_data(controller.clone())
            .app_data(metrics.clone())
            .configure(api::configure)
    })
    .bind(config.bind)
    .with_context(|| format!("failed to bind {}", config.bind))?
    .run()
    .await?;

    tracing::info!("👋 Shutdown complete");
    Ok(())
}
