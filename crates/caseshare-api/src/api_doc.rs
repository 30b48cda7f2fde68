//! OpenAPI documentation, served at `/api/openapi.json` and rendered by RapiDoc at `/docs`.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use caseshare_core::models;
use caseshare_core::SanitizationResult;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Caseshare API",
        version = "0.1.0",
        description = "Provisions SharePoint case folders and brokers resumable upload sessions for case media. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::folders::create_folder,
        handlers::upload_url::get_upload_url,
        handlers::sanitize::sanitize_names,
        handlers::legacy::submit_case,
    ),
    components(schemas(
        ErrorResponse,
        SanitizationResult,
        models::CreateFolderRequest,
        models::CreateFolderResponse,
        models::UploadUrlRequest,
        models::UploadUrlResponse,
        models::SanitizeRequest,
        models::SanitizeResponse,
        models::FolderProvisionResult,
        models::BatchReport,
        models::UploadedFile,
        models::FailedFile,
        models::FilenameChange,
        models::CaseSubmissionResponse,
    )),
    tags(
        (name = "folders", description = "Case folder provisioning"),
        (name = "uploads", description = "Direct upload sessions and name preview"),
        (name = "legacy", description = "Server-side multipart submission"),
    )
)]
pub struct ApiDoc;
