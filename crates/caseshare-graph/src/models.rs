//! Wire formats of the Graph endpoints we call

use caseshare_core::models::DriveDescriptor;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct DriveList {
    #[serde(default)]
    pub value: Vec<DriveDescriptor>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadSessionResponse {
    pub upload_url: String,
    pub expiration_date_time: Option<DateTime<Utc>>,
}

/// Reply to an intermediate chunk
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChunkAck {
    pub next_expected_ranges: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphErrorEnvelope {
    pub error: GraphErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}
