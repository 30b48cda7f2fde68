//! SharePoint operations used by the uploader

use std::sync::Arc;

use bytes::Bytes;
use caseshare_core::config::{GraphConfig, LibraryConfig};
use caseshare_core::models::{DriveDescriptor, FolderProvisionResult};
use reqwest::Client;

use crate::client::{build_http_client, build_upload_client, GraphClient};
use crate::drives::{DriveMatcher, DriveResolver};
use crate::error::GraphResult;
use crate::folders::FolderProvisioner;
use crate::sessions::{BrokeredSession, UploadSessionBroker};
use crate::token::{ClientCredentials, TokenProvider};
use crate::upload::{ChunkedUploader, UploadOutcome, UploadProgress};

/// Entry point for folder provisioning and upload sessions.
///
/// Cloning is cheap. Each operation acquires its own access token.
#[derive(Clone)]
pub struct SharePointService {
    http: Client,
    upload_http: Client,
    api_base: String,
    resolver: DriveResolver,
    tokens: Arc<dyn TokenProvider>,
}

impl SharePointService {
    pub fn new(graph: &GraphConfig, library: &LibraryConfig) -> GraphResult<Self> {
        let tokens = Arc::new(ClientCredentials::new(graph)?);
        Self::with_token_provider(graph, library, tokens)
    }

    pub fn with_token_provider(
        graph: &GraphConfig,
        library: &LibraryConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> GraphResult<Self> {
        let http = build_http_client(graph.timeout_secs, graph.connect_timeout_secs)?;
        let upload_http = build_upload_client(graph.connect_timeout_secs)?;
        Ok(Self {
            http,
            upload_http,
            api_base: graph.api_base.clone(),
            resolver: DriveResolver::new(graph.site_id.clone(), DriveMatcher::from_config(library)),
            tokens,
        })
    }

    pub fn resolver(&self) -> &DriveResolver {
        &self.resolver
    }

    /// Graph client carrying a freshly acquired token.
    pub async fn client(&self) -> GraphResult<GraphClient> {
        let token = self.tokens.access_token().await?;
        Ok(GraphClient::new(self.http.clone(), self.api_base.clone(), token))
    }

    /// Uploader for session URLs. Unlike Graph calls, transfers have no overall timeout.
    pub fn uploader(&self) -> ChunkedUploader {
        ChunkedUploader::new(self.upload_http.clone())
    }

    pub async fn resolve_drive(&self) -> GraphResult<DriveDescriptor> {
        let client = self.client().await?;
        self.resolver.resolve(&client).await
    }

    pub async fn ensure_folder(&self, folder_name: &str) -> GraphResult<FolderProvisionResult> {
        let client = self.client().await?;
        FolderProvisioner::new(&client, &self.resolver)
            .ensure_folder(folder_name)
            .await
    }

    pub async fn create_upload_session(
        &self,
        folder_name: &str,
        file_name: &str,
    ) -> GraphResult<BrokeredSession> {
        let client = self.client().await?;
        UploadSessionBroker::new(&client, &self.resolver)
            .create_session(folder_name, file_name)
            .await
    }

    /// Create a session for one file and push its bytes.
    #[tracing::instrument(skip(self, data, progress), fields(size = data.len()))]
    pub async fn upload_file(
        &self,
        folder_name: &str,
        file_name: &str,
        data: Bytes,
        progress: &dyn UploadProgress,
    ) -> GraphResult<(BrokeredSession, UploadOutcome)> {
        let brokered = self.create_upload_session(folder_name, file_name).await?;
        let outcome = self
            .uploader()
            .upload(data, &brokered.session.upload_url, progress)
            .await?;
        tracing::info!(
            folder = %brokered.folder_name,
            file = %brokered.sanitization.sanitized,
            requests = outcome.requests,
            "File uploaded"
        );
        Ok((brokered, outcome))
    }
}
