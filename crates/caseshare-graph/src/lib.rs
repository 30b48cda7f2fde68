//! Caseshare Graph Library
//!
//! Talks to Microsoft Graph on behalf of the uploader:
//!
//! - [`token`] acquires an app-only access token (client credentials).
//! - [`drives`] picks the document library that receives case folders.
//! - [`folders`] makes sure a case folder exists.
//! - [`sessions`] brokers resumable upload sessions.
//! - [`upload`] pushes file bytes to an upload session, in chunks when needed.
//!
//! [`SharePointService`] ties these together. It acquires a fresh token for every
//! operation and keeps no state between calls; SharePoint is the source of truth.

pub mod client;
pub mod drives;
pub mod error;
pub mod folders;
pub(crate) mod models;
pub mod service;
pub mod sessions;
pub mod token;
pub mod upload;

// Re-export commonly used types
pub use client::GraphClient;
pub use drives::{DriveMatcher, DriveResolver};
pub use error::{GraphError, GraphResult};
pub use folders::FolderProvisioner;
pub use service::SharePointService;
pub use sessions::{BrokeredSession, UploadSessionBroker};
pub use token::{AccessToken, ClientCredentials, StaticToken, TokenProvider};
pub use upload::{
    ChunkPlan, ChunkWindow, ChunkedUploader, NoProgress, UploadOutcome, UploadProgress,
};
