use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use caseshare_core::models::{UploadUrlRequest, UploadUrlResponse};
use std::sync::Arc;

/// Create an upload session for one file inside a case folder
///
/// The returned URL accepts byte-range PUTs directly; file bytes never pass through
/// this service. An existing file with the same sanitized name is replaced.
#[utoipa::path(
    post,
    path = "/api/v0/upload-url",
    tag = "uploads",
    request_body = UploadUrlRequest,
    responses(
        (status = 200, description = "Upload session created", body = UploadUrlResponse),
        (status = 400, description = "Missing folder or file name", body = ErrorResponse),
        (status = 404, description = "No suitable document library", body = ErrorResponse),
        (status = 502, description = "SharePoint or authentication failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(
        folder = %request.folder_name,
        file = %request.file_name,
        operation = "get_upload_url"
    )
)]
pub async fn get_upload_url(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UploadUrlRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let brokered = state
        .sharepoint
        .create_upload_session(&request.folder_name, &request.file_name)
        .await?;

    Ok(Json(UploadUrlResponse {
        success: true,
        upload_url: brokered.session.upload_url,
        original_filename: brokered.sanitization.original,
        sanitized_filename: brokered.sanitization.sanitized,
        filename_changed: brokered.sanitization.changes_made,
        folder_name: brokered.folder_name,
        drive_name: brokered.drive.name,
        expires_at: brokered.session.expires_at,
    }))
}
