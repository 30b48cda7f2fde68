//! Domain methods for the caseshare API client.

use std::path::Path;

use anyhow::{Context, Result};
use caseshare_core::models::{
    CaseSubmissionResponse, CreateFolderRequest, CreateFolderResponse, SanitizeRequest,
    SanitizeResponse, UploadUrlRequest, UploadUrlResponse,
};

use crate::{ApiClient, API_PREFIX};

impl ApiClient {
    /// Ensure the case folder exists.
    pub async fn create_folder(&self, folder_name: &str) -> Result<CreateFolderResponse> {
        self.post_json(
            &format!("{}/folders", API_PREFIX),
            &CreateFolderRequest {
                folder_name: folder_name.to_string(),
            },
        )
        .await
    }

    /// Create an upload session for one file.
    pub async fn get_upload_url(
        &self,
        folder_name: &str,
        file_name: &str,
    ) -> Result<UploadUrlResponse> {
        self.post_json(
            &format!("{}/upload-url", API_PREFIX),
            &UploadUrlRequest {
                folder_name: folder_name.to_string(),
                file_name: file_name.to_string(),
            },
        )
        .await
    }

    /// Preview how names will be stored.
    pub async fn sanitize(&self, names: &[String], preserve_spaces: bool) -> Result<SanitizeResponse> {
        self.post_json(
            &format!("{}/sanitize", API_PREFIX),
            &SanitizeRequest {
                names: names.to_vec(),
                preserve_spaces,
            },
        )
        .await
    }

    /// Submit a case through the server-side multipart path.
    pub async fn submit_case_legacy(
        &self,
        case_id: &str,
        files: &[impl AsRef<Path>],
    ) -> Result<CaseSubmissionResponse> {
        let mut form = reqwest::multipart::Form::new().text("caseid", case_id.to_string());

        for file in files {
            let path = file.as_ref();
            let data = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| format!("Invalid file name: {}", path.display()))?
                .to_string();
            form = form.part(
                "case_files[]",
                reqwest::multipart::Part::bytes(data).file_name(file_name),
            );
        }

        self.post_multipart(&format!("{}/legacy/cases", API_PREFIX), form)
            .await
    }

    /// Liveness of the API server.
    pub async fn health(&self) -> Result<serde_json::Value> {
        self.get("/health").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_create_folder_posts_folder_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/folders"))
            .and(body_json(serde_json::json!({"folder_name": "CASE-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "already_exists": true,
                "folder_name": "CASE-1",
                "drive_name": "CasesandIncidentsFiles",
                "message": "Folder 'CASE-1' already exists in CasesandIncidentsFiles"
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let folder = client.create_folder("CASE-1").await.unwrap();
        assert!(folder.already_exists);
        assert_eq!(folder.drive_name, "CasesandIncidentsFiles");
    }

    #[tokio::test]
    async fn test_error_body_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/upload-url"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "success": false,
                "error": "No suitable document library found",
                "code": "NO_SUITABLE_LIBRARY"
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let err = client.get_upload_url("CASE-1", "a.jpg").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("No suitable document library found"));
    }

    #[tokio::test]
    async fn test_legacy_submission_sends_case_id_and_files() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/legacy/cases"))
            .and(body_string_contains("name=\"caseid\""))
            .and(body_string_contains("filename=\"scene.jpg\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "1 uploaded, 0 failed",
                "report": {
                    "success": [{"original_name": "scene.jpg", "final_name": "scene.jpg", "size": 4}],
                    "failed": [],
                    "errors": [],
                    "filename_changes": []
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("scene.jpg");
        std::fs::write(&file, b"jpeg").unwrap();

        let client = ApiClient::new(server.uri()).unwrap();
        let response = client.submit_case_legacy("CASE-2", &[file]).await.unwrap();
        assert!(response.success);
        assert_eq!(response.report.success.len(), 1);
    }
}
