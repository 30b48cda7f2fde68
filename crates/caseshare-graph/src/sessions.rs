//! Resumable upload sessions

use caseshare_core::models::{DriveDescriptor, UploadSession};
use caseshare_core::{sanitize_filename, sanitize_folder_name, SanitizationResult};
use serde_json::json;

use crate::client::{encode_segment, read_json, GraphClient};
use crate::drives::DriveResolver;
use crate::error::{GraphError, GraphResult};
use crate::models::UploadSessionResponse;

/// An upload session together with the names it was created for
#[derive(Debug, Clone)]
pub struct BrokeredSession {
    pub session: UploadSession,
    pub sanitization: SanitizationResult,
    pub folder_name: String,
    pub drive: DriveDescriptor,
}

/// Creates upload sessions for files inside a case folder.
///
/// Nothing is remembered between calls. Sessions replace an existing file of the same
/// name.
pub struct UploadSessionBroker<'a> {
    client: &'a GraphClient,
    resolver: &'a DriveResolver,
}

impl<'a> UploadSessionBroker<'a> {
    pub fn new(client: &'a GraphClient, resolver: &'a DriveResolver) -> Self {
        Self { client, resolver }
    }

    #[tracing::instrument(skip(self), fields(operation = "create_upload_session"))]
    pub async fn create_session(
        &self,
        folder_name: &str,
        file_name: &str,
    ) -> GraphResult<BrokeredSession> {
        let folder = sanitize_folder_name(folder_name);
        if folder.is_empty() {
            return Err(GraphError::InvalidInput("Folder name is required".to_string()));
        }
        if file_name.trim().is_empty() {
            return Err(GraphError::InvalidInput("File name is required".to_string()));
        }

        let sanitization = sanitize_filename(file_name, false);
        if sanitization.changes_made {
            tracing::info!(
                original = %sanitization.original,
                sanitized = %sanitization.sanitized,
                "File name sanitized"
            );
        }

        let drive = self.resolver.resolve(self.client).await?;

        let path = format!(
            "/drives/{}/root:/{}/{}:/createUploadSession",
            drive.id,
            encode_segment(&folder),
            encode_segment(&sanitization.sanitized)
        );
        let body = json!({
            "item": {
                "@microsoft.graph.conflictBehavior": "replace"
            }
        });

        let response = self.client.post_json(&path, &body).await?;
        let created: UploadSessionResponse = read_json(response).await?;

        tracing::info!(
            folder = %folder,
            file = %sanitization.sanitized,
            expires_at = ?created.expiration_date_time,
            "Upload session created"
        );

        Ok(BrokeredSession {
            session: UploadSession {
                upload_url: created.upload_url,
                expires_at: created.expiration_date_time,
            },
            sanitization,
            folder_name: folder,
            drive,
        })
    }
}
