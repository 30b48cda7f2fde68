use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of drive as reported by Graph's `driveType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum DriveType {
    DocumentLibrary,
    #[serde(other)]
    Other,
}

/// A document library exposed by the site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DriveDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default = "default_drive_type")]
    pub drive_type: DriveType,
}

fn default_drive_type() -> DriveType {
    DriveType::Other
}

impl DriveDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, drive_type: DriveType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            drive_type,
        }
    }

    pub fn is_document_library(&self) -> bool {
        self.drive_type == DriveType::DocumentLibrary
    }
}
