//! Service Intello dashboard - filtered reporting over monthly spreadsheet exports.

mod api;
mod config;
mod dataset;
mod display;
mod error;
mod export;
mod headers;
mod index;
mod kpi;
mod loader;
mod normalize;
mod record;
mod registry;
mod selection;
mod sheet_parser;

use std::sync::Arc;

use anyhow::Context;
use api::AppState;
use config::AppConfig;
use registry::DatasetRegistry;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "intello_dashboard=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    info!("Data directory: {:?}", config.data_dir);

    // Every workbook is read exactly once, here.
    let registry = DatasetRegistry::load(&config.sources);
    info!("Loaded {} datasets", registry.len());
    for (kind, _) in &config.sources {
        if let Some(dataset) = registry.get(*kind) {
            if let Some(err) = dataset.load_error() {
                warn!("{} will serve errors: {}", dataset.name(), err);
            }
        }
    }

    let state = AppState {
        registry: Arc::new(registry),
    };
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_target())
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
    info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
