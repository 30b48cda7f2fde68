use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::FolderProvisionResult;
use crate::sanitize::SanitizationResult;

/// A file that reached SharePoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadedFile {
    pub original_name: String,
    pub final_name: String,
    pub size: u64,
}

/// A file that did not make it, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FailedFile {
    pub original_name: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FilenameChange {
    pub original: String,
    pub sanitized: String,
}

impl From<&SanitizationResult> for FilenameChange {
    fn from(result: &SanitizationResult) -> Self {
        Self {
            original: result.original.clone(),
            sanitized: result.sanitized.clone(),
        }
    }
}

/// Per-file outcome of a batch submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BatchReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<FolderProvisionResult>,
    pub success: Vec<UploadedFile>,
    pub failed: Vec<FailedFile>,
    pub errors: Vec<String>,
    pub filename_changes: Vec<FilenameChange>,
}

impl BatchReport {
    pub fn record_success(&mut self, original_name: &str, final_name: &str, size: u64) {
        self.success.push(UploadedFile {
            original_name: original_name.to_string(),
            final_name: final_name.to_string(),
            size,
        });
    }

    pub fn record_failure(&mut self, original_name: &str, error: impl Into<String>) {
        let error = error.into();
        self.errors.push(format!("{}: {}", original_name, error));
        self.failed.push(FailedFile {
            original_name: original_name.to_string(),
            error,
        });
    }

    pub fn record_change(&mut self, result: &SanitizationResult) {
        if result.changes_made {
            self.filename_changes.push(result.into());
        }
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty() && self.folder.as_ref().map_or(true, |f| f.success)
    }

    /// One-line summary, e.g. "2 uploaded, 1 failed".
    pub fn summary(&self) -> String {
        format!("{} uploaded, {} failed", self.success.len(), self.failed.len())
    }
}

/// Response of the server-side (legacy) case submission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseSubmissionResponse {
    pub success: bool,
    pub message: String,
    pub report: BatchReport,
}
