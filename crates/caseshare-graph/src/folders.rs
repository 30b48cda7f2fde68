//! Case folder provisioning

use caseshare_core::models::FolderProvisionResult;
use caseshare_core::sanitize_folder_name;
use reqwest::StatusCode;
use serde_json::json;

use crate::client::{encode_segment, error_from_response, GraphClient};
use crate::drives::DriveResolver;
use crate::error::{GraphError, GraphResult};

/// Ensures a folder exists at the root of the target drive.
///
/// Every call re-resolves the drive and re-probes the folder. Creation uses the `fail`
/// conflict behavior, so a folder created concurrently surfaces as a conflict instead
/// of being renamed.
pub struct FolderProvisioner<'a> {
    client: &'a GraphClient,
    resolver: &'a DriveResolver,
}

impl<'a> FolderProvisioner<'a> {
    pub fn new(client: &'a GraphClient, resolver: &'a DriveResolver) -> Self {
        Self { client, resolver }
    }

    #[tracing::instrument(skip(self), fields(operation = "ensure_folder"))]
    pub async fn ensure_folder(&self, raw_name: &str) -> GraphResult<FolderProvisionResult> {
        let folder = sanitize_folder_name(raw_name);
        if folder.is_empty() {
            return Err(GraphError::InvalidInput("Folder name is required".to_string()));
        }

        let drive = self.resolver.resolve(self.client).await?;

        let probe = self
            .client
            .get(&format!("/drives/{}/root:/{}", drive.id, encode_segment(&folder)))
            .await?;
        if probe.status() == StatusCode::OK {
            tracing::info!(folder = %folder, drive_name = %drive.name, "Folder already exists");
            return Ok(FolderProvisionResult::existing(folder, &drive));
        }
        tracing::debug!(
            folder = %folder,
            probe_status = probe.status().as_u16(),
            "Folder not found, creating"
        );

        let body = json!({
            "name": folder,
            "folder": {},
            "@microsoft.graph.conflictBehavior": "fail"
        });
        let response = self
            .client
            .post_json(&format!("/drives/{}/root/children", drive.id), &body)
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                tracing::info!(folder = %folder, drive_name = %drive.name, "Folder created");
                Ok(FolderProvisionResult::created(folder, &drive))
            }
            StatusCode::CONFLICT => {
                tracing::warn!(folder = %folder, "Folder creation conflicted");
                Err(GraphError::Conflict(folder))
            }
            _ => {
                let err = error_from_response(response).await;
                tracing::warn!(folder = %folder, error = %err, "Folder creation failed");
                Err(err)
            }
        }
    }
}
