use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::sanitize::SanitizationResult;

/// A resumable upload session for one file.
///
/// The URL is pre-authorized and expires at `expires_at`; it must not be reused for
/// another file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadSession {
    pub upload_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl UploadSession {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }
}

/// Request for a direct-upload URL
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadUrlRequest {
    /// Case folder the file goes into
    #[serde(alias = "folderName")]
    pub folder_name: String,
    /// Original file name; the server sanitizes it
    #[serde(alias = "fileName")]
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadUrlResponse {
    pub success: bool,
    pub upload_url: String,
    pub original_filename: String,
    pub sanitized_filename: String,
    pub filename_changed: bool,
    pub folder_name: String,
    pub drive_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request to preview how names will be stored
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SanitizeRequest {
    pub names: Vec<String>,
    #[serde(default)]
    pub preserve_spaces: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SanitizeResponse {
    pub success: bool,
    pub results: Vec<SanitizationResult>,
}
