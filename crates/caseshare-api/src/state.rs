//! Application state shared by handlers

use caseshare_core::{BatchValidator, Config};
use caseshare_graph::SharePointService;

/// Everything a handler needs. Nothing here changes after startup.
#[derive(Clone)]
pub struct AppState {
    pub sharepoint: SharePointService,
    pub validator: BatchValidator,
}

impl AppState {
    pub fn new(config: &Config, sharepoint: SharePointService) -> Self {
        Self {
            sharepoint,
            validator: BatchValidator::from_policy(config.upload_policy()),
        }
    }
}
