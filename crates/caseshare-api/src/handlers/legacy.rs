//! Server-side case submission
//!
//! The form posts the case id and the files in one multipart request. The folder is
//! provisioned first; files are then uploaded one at a time through their own upload
//! session. A failing file does not stop the rest of the batch.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use caseshare_core::models::{BatchReport, CaseSubmissionResponse};
use caseshare_core::{AppError, ErrorMetadata};
use std::sync::Arc;

/// Multipart field carrying the case identifier
const CASE_ID_FIELD: &str = "caseid";

/// One file part of the submission
struct SubmittedFile {
    name: String,
    data: Bytes,
}

struct CaseSubmission {
    case_id: String,
    files: Vec<SubmittedFile>,
}

/// Reads the case id and every part that carries a file name, in submission order.
async fn read_submission(mut multipart: Multipart) -> Result<CaseSubmission, HttpAppError> {
    let mut case_id: Option<String> = None;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == CASE_ID_FIELD {
            case_id = Some(field.text().await?.trim().to_string());
            continue;
        }

        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            tracing::debug!(field = %field_name, "Ignoring non-file form field");
            continue;
        };
        // Browsers send an empty part when no file was chosen
        if file_name.is_empty() {
            continue;
        }

        let data = field.bytes().await?;
        files.push(SubmittedFile {
            name: file_name,
            data,
        });
    }

    let case_id = case_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Case ID is required".to_string()))?;

    Ok(CaseSubmission { case_id, files })
}

/// Create the case folder and upload the attached files server-side
#[utoipa::path(
    post,
    path = "/api/v0/legacy/cases",
    tag = "legacy",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Folder ready; per-file results in the report", body = CaseSubmissionResponse),
        (status = 400, description = "Missing case id or invalid batch", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "SharePoint or authentication failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "submit_case"))]
pub async fn submit_case(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let submission = read_submission(multipart).await?;

    // Reject the whole batch before any SharePoint call
    let sanitized = if submission.files.is_empty() {
        Vec::new()
    } else {
        state.validator.validate_batch(
            submission
                .files
                .iter()
                .map(|f| (f.name.as_str(), f.data.len() as u64)),
        )?
    };

    let folder = state.sharepoint.ensure_folder(&submission.case_id).await?;
    tracing::info!(
        case_id = %submission.case_id,
        folder = %folder.folder_name,
        already_exists = folder.already_exists,
        files = submission.files.len(),
        "Case folder ready"
    );

    let mut report = BatchReport {
        folder: Some(folder.clone()),
        ..Default::default()
    };

    for (file, sanitization) in submission.files.into_iter().zip(sanitized.iter()) {
        report.record_change(sanitization);

        let size = file.data.len() as u64;
        let file_name = file.name.clone();
        let progress = move |percent: u8, status: &str| {
            tracing::debug!(file = %file_name, percent, status, "Upload progress");
        };

        // Upload under the validated name; sanitizing it again is a no-op
        match state
            .sharepoint
            .upload_file(&folder.folder_name, &sanitization.sanitized, file.data, &progress)
            .await
        {
            Ok((brokered, _outcome)) => {
                report.record_success(&file.name, &brokered.sanitization.sanitized, size);
            }
            Err(e) => {
                tracing::warn!(file = %file.name, error = %e, "File upload failed");
                report.record_failure(&file.name, AppError::from(e).client_message());
            }
        }
    }

    let message = if report.success.is_empty() && report.failed.is_empty() {
        folder.message()
    } else {
        format!("{}; {}", folder.message(), report.summary())
    };

    Ok(Json(CaseSubmissionResponse {
        success: report.is_complete_success(),
        message,
        report,
    }))
}
