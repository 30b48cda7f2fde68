//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use caseshare_core::Config;
use caseshare_graph::SharePointService;
use caseshare_infra::{init_telemetry, LogFormat};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    init_telemetry(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        LogFormat::for_environment(config.environment()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let sharepoint = SharePointService::new(config.graph(), config.library())
        .context("Failed to create SharePoint client")?;
    let state = Arc::new(AppState::new(&config, sharepoint));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
