//! Sequential case uploads
//!
//! A case upload validates the whole batch locally, provisions the case folder once and
//! then uploads files one at a time, in the order given. Folder failure aborts the batch;
//! a failing file is recorded and the loop moves on.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use caseshare_core::models::{BatchReport, CreateFolderResponse, UploadUrlResponse};
use caseshare_core::{AppError, BatchValidator, ErrorMetadata};
use caseshare_graph::{ChunkedUploader, SharePointService};

use crate::ApiClient;

/// Creates folders and upload sessions on behalf of the batch loop.
#[async_trait]
pub trait UploadCoordinator: Send + Sync {
    async fn ensure_folder(&self, folder_name: &str) -> Result<CreateFolderResponse>;

    async fn upload_url(&self, folder_name: &str, file_name: &str) -> Result<UploadUrlResponse>;
}

#[async_trait]
impl UploadCoordinator for ApiClient {
    async fn ensure_folder(&self, folder_name: &str) -> Result<CreateFolderResponse> {
        self.create_folder(folder_name).await
    }

    async fn upload_url(&self, folder_name: &str, file_name: &str) -> Result<UploadUrlResponse> {
        self.get_upload_url(folder_name, file_name).await
    }
}

/// Talks to SharePoint directly, without the API server in between.
#[async_trait]
impl UploadCoordinator for SharePointService {
    async fn ensure_folder(&self, folder_name: &str) -> Result<CreateFolderResponse> {
        let result = SharePointService::ensure_folder(self, folder_name)
            .await
            .map_err(|e| anyhow::anyhow!(AppError::from(e).client_message()))?;
        Ok(CreateFolderResponse::from(result))
    }

    async fn upload_url(&self, folder_name: &str, file_name: &str) -> Result<UploadUrlResponse> {
        let brokered = self
            .create_upload_session(folder_name, file_name)
            .await
            .map_err(|e| anyhow::anyhow!(AppError::from(e).client_message()))?;
        Ok(UploadUrlResponse {
            success: true,
            upload_url: brokered.session.upload_url,
            original_filename: brokered.sanitization.original,
            sanitized_filename: brokered.sanitization.sanitized,
            filename_changed: brokered.sanitization.changes_made,
            folder_name: brokered.folder_name,
            drive_name: brokered.drive.name,
            expires_at: brokered.session.expires_at,
        })
    }
}

/// A file on disk queued for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

impl LocalFile {
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        if !metadata.is_file() {
            return Err(anyhow::anyhow!("Not a file: {}", path.display()));
        }
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Invalid file name: {}", path.display()))?
            .to_string();
        Ok(Self {
            name,
            path: path.to_path_buf(),
            size: metadata.len(),
        })
    }
}

/// Receives progress for each file of a batch.
pub trait BatchProgress: Send + Sync {
    fn file_progress(&self, file_name: &str, percent: u8, status: &str);
}

/// Latest progress of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProgress {
    pub file_name: String,
    pub percent: u8,
    pub status: String,
}

/// Progress of every file, in the order files were first reported.
#[derive(Debug, Default)]
pub struct ProgressBoard {
    entries: Mutex<Vec<FileProgress>>,
}

impl ProgressBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<FileProgress> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl BatchProgress for ProgressBoard {
    fn file_progress(&self, file_name: &str, percent: u8, status: &str) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        match entries.iter_mut().find(|e| e.file_name == file_name) {
            Some(entry) => {
                entry.percent = percent;
                entry.status = status.to_string();
            }
            None => entries.push(FileProgress {
                file_name: file_name.to_string(),
                percent,
                status: status.to_string(),
            }),
        }
    }
}

/// Outcome of a case upload
#[derive(Debug, Clone)]
pub struct CaseUpload {
    pub folder: CreateFolderResponse,
    pub report: BatchReport,
}

/// Uploads a batch of local files into one case folder.
pub struct BatchUploader<C> {
    coordinator: C,
    uploader: ChunkedUploader,
    validator: BatchValidator,
}

impl<C: UploadCoordinator> BatchUploader<C> {
    pub fn new(coordinator: C, uploader: ChunkedUploader, validator: BatchValidator) -> Self {
        Self {
            coordinator,
            uploader,
            validator,
        }
    }

    #[tracing::instrument(skip(self, files, progress), fields(files = files.len()))]
    pub async fn upload_case(
        &self,
        case_id: &str,
        files: &[LocalFile],
        progress: &dyn BatchProgress,
    ) -> Result<CaseUpload> {
        // Validation runs before any network call
        let sanitized = self
            .validator
            .validate_batch(files.iter().map(|f| (f.name.as_str(), f.size)))?;

        let folder = self
            .coordinator
            .ensure_folder(case_id)
            .await
            .context("Failed to create case folder")?;
        tracing::info!(
            folder = %folder.folder_name,
            already_exists = folder.already_exists,
            "Case folder ready"
        );

        let mut report = BatchReport::default();
        for (file, sanitization) in files.iter().zip(sanitized.iter()) {
            report.record_change(sanitization);
            progress.file_progress(&file.name, 0, "Preparing...");

            match self
                .upload_one(&folder.folder_name, file, &sanitization.sanitized, progress)
                .await
            {
                Ok(final_name) => {
                    progress.file_progress(&file.name, 100, "Complete");
                    report.record_success(&file.name, &final_name, file.size);
                }
                Err(e) => {
                    let message = format!("{:#}", e);
                    tracing::warn!(file = %file.name, error = %message, "File upload failed");
                    progress.file_progress(&file.name, 0, &format!("Error: {}", message));
                    report.record_failure(&file.name, message);
                }
            }
        }

        tracing::info!(summary = %report.summary(), "Case upload finished");
        Ok(CaseUpload { folder, report })
    }

    /// Upload one file under the name validation settled on. Sanitizing is idempotent, so
    /// the coordinator stores exactly `stored_name`.
    async fn upload_one(
        &self,
        folder_name: &str,
        file: &LocalFile,
        stored_name: &str,
        progress: &dyn BatchProgress,
    ) -> Result<String> {
        let session = self.coordinator.upload_url(folder_name, stored_name).await?;

        let per_file = |percent: u8, status: &str| progress.file_progress(&file.name, percent, status);
        self.uploader
            .upload_path(&file.path, &session.upload_url, &per_file)
            .await
            .map_err(|e| anyhow::anyhow!(AppError::from(e).client_message()))?;

        Ok(session.sanitized_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caseshare_core::UploadPolicy;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn validator() -> BatchValidator {
        BatchValidator::from_policy(&UploadPolicy::new(
            5,
            1,
            vec!["jpg".to_string(), "mp4".to_string()],
        ))
    }

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    async fn mount_folder(server: &MockServer, folder: &str) {
        Mock::given(method("POST"))
            .and(path("/api/v0/folders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "already_exists": false,
                "folder_name": folder,
                "drive_name": "CasesandIncidentsFiles",
                "message": "created"
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_session(server: &MockServer, sanitized: &str, upload_path: &str) {
        Mock::given(method("POST"))
            .and(path("/api/v0/upload-url"))
            .and(body_json(serde_json::json!({
                "folder_name": "CASE-1",
                "file_name": sanitized
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "upload_url": format!("{}{}", server.uri(), upload_path),
                "original_filename": sanitized,
                "sanitized_filename": sanitized,
                "filename_changed": false,
                "folder_name": "CASE-1",
                "drive_name": "CasesandIncidentsFiles"
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_uploads_files_in_order_and_reports_each() {
        let server = MockServer::start().await;
        mount_folder(&server, "CASE-1").await;
        mount_session(&server, "front_door.jpg", "/put/1").await;
        mount_session(&server, "clip.mp4", "/put/2").await;
        Mock::given(method("PUT"))
            .and(path("/put/1"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/put/2"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": {"code": "serviceNotAvailable", "message": "Try later"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            LocalFile::from_path(write_file(dir.path(), "front door.jpg", b"jpeg"))
                .await
                .unwrap(),
            LocalFile::from_path(write_file(dir.path(), "clip.mp4", b"mpeg"))
                .await
                .unwrap(),
        ];

        let board = ProgressBoard::new();
        let uploader = BatchUploader::new(
            ApiClient::new(server.uri()).unwrap(),
            ChunkedUploader::new(reqwest::Client::new()),
            validator(),
        );
        let outcome = uploader.upload_case("CASE-1", &files, &board).await.unwrap();

        assert_eq!(outcome.folder.folder_name, "CASE-1");
        assert_eq!(outcome.report.success.len(), 1);
        assert_eq!(outcome.report.success[0].final_name, "front_door.jpg");
        assert_eq!(outcome.report.failed.len(), 1);
        assert_eq!(outcome.report.failed[0].original_name, "clip.mp4");
        assert_eq!(outcome.report.filename_changes.len(), 1);
        assert!(!outcome.report.is_complete_success());

        let snapshot = board.snapshot();
        assert_eq!(snapshot[0].file_name, "front door.jpg");
        assert_eq!(snapshot[0].percent, 100);
        assert_eq!(snapshot[1].file_name, "clip.mp4");
        assert_eq!(snapshot[1].percent, 0);
        assert!(snapshot[1].status.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_duplicate_names_block_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("other");
        std::fs::create_dir(&sub).unwrap();
        let files = vec![
            LocalFile::from_path(write_file(dir.path(), "Report #1.jpg", b"a"))
                .await
                .unwrap(),
            LocalFile::from_path(write_file(&sub, "Report 1.jpg", b"b"))
                .await
                .unwrap(),
        ];

        let uploader = BatchUploader::new(
            ApiClient::new(server.uri()).unwrap(),
            ChunkedUploader::new(reqwest::Client::new()),
            validator(),
        );
        let err = uploader
            .upload_case("CASE-1", &files, &ProgressBoard::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Report_1.jpg"));
    }

    #[tokio::test]
    async fn test_folder_failure_aborts_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/folders"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "success": false,
                "error": "Folder 'CASE-1' already exists",
                "code": "CONFLICT"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v0/upload-url"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let files = vec![LocalFile::from_path(write_file(dir.path(), "a.jpg", b"a"))
            .await
            .unwrap()];

        let uploader = BatchUploader::new(
            ApiClient::new(server.uri()).unwrap(),
            ChunkedUploader::new(reqwest::Client::new()),
            validator(),
        );
        let err = uploader
            .upload_case("CASE-1", &files, &ProgressBoard::new())
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("already exists"));
    }

    #[tokio::test]
    async fn test_sharepoint_service_as_coordinator() {
        use caseshare_core::config::{GraphConfig, LibraryConfig};
        use caseshare_graph::{AccessToken, StaticToken};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sites/site-1/drives"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{"id": "b!cases", "name": "CasesandIncidentsFiles", "driveType": "documentLibrary"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/drives/b!cases/root:/CASE-3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "d"})))
            .mount(&server)
            .await;

        let graph = GraphConfig {
            tenant_id: "t".to_string(),
            client_id: "c".to_string(),
            client_secret: secrecy::SecretString::from("s".to_string()),
            site_id: "site-1".to_string(),
            api_base: server.uri(),
            login_base: server.uri(),
            timeout_secs: 5,
            connect_timeout_secs: 5,
        };
        let service = SharePointService::with_token_provider(
            &graph,
            &LibraryConfig::cases_and_incidents(),
            Arc::new(StaticToken(AccessToken::new("tok"))),
        )
        .unwrap();

        let folder = UploadCoordinator::ensure_folder(&service, "CASE-3").await.unwrap();
        assert!(folder.already_exists);
        assert_eq!(folder.drive_name, "CasesandIncidentsFiles");
    }

    #[test]
    fn test_progress_board_keeps_first_report_order() {
        let board = ProgressBoard::new();
        board.file_progress("b.jpg", 0, "Preparing...");
        board.file_progress("a.jpg", 0, "Preparing...");
        board.file_progress("b.jpg", 50, "Uploading...");
        let snapshot = board.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].file_name, "b.jpg");
        assert_eq!(snapshot[0].percent, 50);
        assert_eq!(snapshot[1].file_name, "a.jpg");
    }
}
