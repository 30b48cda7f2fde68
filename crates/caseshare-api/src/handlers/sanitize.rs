use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use axum::{response::IntoResponse, Json};
use caseshare_core::models::{SanitizeRequest, SanitizeResponse};
use caseshare_core::{sanitize_filename, AppError};

/// Upper bound on names per preview request
const MAX_PREVIEW_NAMES: usize = 100;

/// Preview how file names will be stored, without contacting SharePoint
#[utoipa::path(
    post,
    path = "/api/v0/sanitize",
    tag = "uploads",
    request_body = SanitizeRequest,
    responses(
        (status = 200, description = "Sanitized names, in request order", body = SanitizeResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn sanitize_names(
    ValidatedJson(request): ValidatedJson<SanitizeRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if request.names.len() > MAX_PREVIEW_NAMES {
        return Err(HttpAppError::from(AppError::InvalidInput(format!(
            "At most {} names can be previewed at once",
            MAX_PREVIEW_NAMES
        ))));
    }

    let results = request
        .names
        .iter()
        .map(|name| sanitize_filename(name, request.preserve_spaces))
        .collect();

    Ok(Json(SanitizeResponse {
        success: true,
        results,
    }))
}
