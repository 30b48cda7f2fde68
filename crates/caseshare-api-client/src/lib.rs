//! Shared HTTP client for the caseshare API.
//!
//! [`ApiClient`] wraps the JSON endpoints. [`batch::BatchUploader`] drives a whole case
//! submission: validate, provision the folder once, then upload each file in order
//! through its own upload session.

pub mod api;
pub mod batch;

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Versioned API prefix; must match the server.
pub const API_PREFIX: &str = "/api/v0";

const DEFAULT_API_URL: &str = "http://localhost:4000";

/// The part of the server's error body the client reports
#[derive(serde::Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the caseshare API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create client from environment: CASESHARE_API_URL (or API_URL).
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("CASESHARE_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET and deserialize a JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.build_url(path))
            .send()
            .await
            .context("Failed to send request")?;
        read_json(response).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.build_url(path))
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;
        read_json(response).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.build_url(path))
            .multipart(form)
            .send()
            .await
            .context("Failed to send request")?;
        read_json(response).await
    }

    /// Raw client, also used for PUTs to upload sessions.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Error message from a failed response; the server's `error` field when present.
async fn error_message(response: Response) -> String {
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = error_message(response).await;
        return Err(anyhow::anyhow!(
            "API request failed with status {}: {}",
            status,
            message
        ));
    }

    response
        .json()
        .await
        .context("Failed to parse response as JSON")
}

pub use batch::{
    BatchProgress, BatchUploader, CaseUpload, FileProgress, LocalFile, ProgressBoard,
    UploadCoordinator,
};
pub use caseshare_core::models::{
    BatchReport, CreateFolderResponse, SanitizeResponse, UploadUrlResponse,
};
