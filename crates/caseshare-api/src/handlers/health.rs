//! Health check handlers

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use caseshare_core::{AppError, ErrorMetadata};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const READINESS_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub sharepoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_name: Option<String>,
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "alive",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// Readiness probe - a token can be acquired and the target library resolves.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, body) =
        match tokio::time::timeout(READINESS_TIMEOUT, state.sharepoint.resolve_drive()).await {
            Ok(Ok(drive)) => (
                StatusCode::OK,
                ReadinessResponse {
                    status: "ready".to_string(),
                    sharepoint: "healthy".to_string(),
                    drive_name: Some(drive.name),
                },
            ),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Readiness check failed");
                let app_error = AppError::from(e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ReadinessResponse {
                        status: "not_ready".to_string(),
                        sharepoint: format!("unhealthy: {}", app_error.client_message()),
                        drive_name: None,
                    },
                )
            }
            Err(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ReadinessResponse {
                    status: "not_ready".to_string(),
                    sharepoint: "timeout".to_string(),
                    drive_name: None,
                },
            ),
        };

    (status, Json(body))
}
