//! Configuration validation
//!
//! Checks run at startup, before any request is served.

use anyhow::Result;
use caseshare_core::Config;

/// Validate critical configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production - this is a security risk. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    if !config.graph().api_base.starts_with("https://") {
        tracing::warn!(
            api_base = %config.graph().api_base,
            "GRAPH_API_BASE is not HTTPS - only use this against a local mock"
        );
    }

    if config.graph().timeout_secs == 0 {
        return Err(anyhow::anyhow!("GRAPH_TIMEOUT_SECS cannot be 0"));
    }

    Ok(())
}
