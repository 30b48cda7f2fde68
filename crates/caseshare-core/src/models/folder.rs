use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::DriveDescriptor;

/// Outcome of ensuring a case folder exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FolderProvisionResult {
    pub success: bool,
    pub already_exists: bool,
    /// Folder name after path-character sanitization
    pub folder_name: String,
    pub drive_id: String,
    pub drive_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl FolderProvisionResult {
    pub fn created(folder_name: impl Into<String>, drive: &DriveDescriptor) -> Self {
        Self {
            success: true,
            already_exists: false,
            folder_name: folder_name.into(),
            drive_id: drive.id.clone(),
            drive_name: drive.name.clone(),
            error_message: None,
        }
    }

    pub fn existing(folder_name: impl Into<String>, drive: &DriveDescriptor) -> Self {
        Self {
            already_exists: true,
            ..Self::created(folder_name, drive)
        }
    }

    /// A provisioning attempt that did not produce a usable folder.
    pub fn failed(folder_name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            success: false,
            already_exists: false,
            folder_name: folder_name.into(),
            drive_id: String::new(),
            drive_name: String::new(),
            error_message: Some(error_message.into()),
        }
    }

    /// Human-readable summary, as shown after a folder-only submission.
    pub fn message(&self) -> String {
        match (self.success, self.already_exists) {
            (true, true) => format!(
                "Folder '{}' already exists in {}",
                self.folder_name, self.drive_name
            ),
            (true, false) => format!(
                "Folder '{}' created successfully in {}",
                self.folder_name, self.drive_name
            ),
            (false, _) => format!(
                "Failed to create folder '{}': {}",
                self.folder_name,
                self.error_message.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

/// Request to create (or confirm) the folder for a case
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateFolderRequest {
    /// Case identifier used as the folder name
    #[serde(alias = "folderName")]
    pub folder_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateFolderResponse {
    pub success: bool,
    pub already_exists: bool,
    pub folder_name: String,
    pub drive_name: String,
    pub message: String,
}

impl From<FolderProvisionResult> for CreateFolderResponse {
    fn from(result: FolderProvisionResult) -> Self {
        let message = result.message();
        Self {
            success: result.success,
            already_exists: result.already_exists,
            folder_name: result.folder_name,
            drive_name: result.drive_name,
            message,
        }
    }
}
