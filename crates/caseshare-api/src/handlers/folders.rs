use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use caseshare_core::models::{CreateFolderRequest, CreateFolderResponse};
use std::sync::Arc;

/// Ensure the case folder exists in the target document library
#[utoipa::path(
    post,
    path = "/api/v0/folders",
    tag = "folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 200, description = "Folder exists or was created", body = CreateFolderResponse),
        (status = 400, description = "Invalid folder name", body = ErrorResponse),
        (status = 404, description = "No suitable document library", body = ErrorResponse),
        (status = 409, description = "Folder was created concurrently", body = ErrorResponse),
        (status = 502, description = "SharePoint or authentication failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(folder = %request.folder_name, operation = "create_folder")
)]
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateFolderRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let result = state.sharepoint.ensure_folder(&request.folder_name).await?;

    tracing::info!(
        folder = %result.folder_name,
        drive_name = %result.drive_name,
        already_exists = result.already_exists,
        "Folder ready"
    );

    Ok(Json(CreateFolderResponse::from(result)))
}
