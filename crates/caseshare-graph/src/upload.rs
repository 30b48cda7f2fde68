//! Pushing file bytes to an upload session
//!
//! Files up to [`SMALL_FILE_THRESHOLD`] go up in a single PUT. Larger files are sent as
//! consecutive byte ranges of [`CHUNK_SIZE`] bytes. Any non-success reply aborts the
//! file; nothing is retried or resumed.

use std::path::Path;

use bytes::Bytes;
use reqwest::{header, Client};

use crate::client::error_from_response;
use crate::error::{GraphError, GraphResult};
use crate::models::ChunkAck;

/// Largest file sent as one request.
pub const SMALL_FILE_THRESHOLD: u64 = 4 * 1024 * 1024;

/// Chunk size for ranged uploads. Graph requires a multiple of 320 KiB.
pub const CHUNK_SIZE: u64 = 320 * 1024 * 4;

/// Share of the progress bar covered by chunk transfers; the rest is completion.
const CHUNK_PROGRESS_SPAN: f64 = 90.0;

/// Receives per-file progress updates (percent 0..=100 and a status line).
pub trait UploadProgress: Send + Sync {
    fn report(&self, percent: u8, status: &str);
}

impl<F> UploadProgress for F
where
    F: Fn(u8, &str) + Send + Sync,
{
    fn report(&self, percent: u8, status: &str) {
        self(percent, status)
    }
}

/// Discards progress updates.
pub struct NoProgress;

impl UploadProgress for NoProgress {
    fn report(&self, _percent: u8, _status: &str) {}
}

/// One byte window `[start, end)` of a chunk plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkWindow {
    pub index: usize,
    pub start: u64,
    pub end: u64,
    pub is_last: bool,
}

impl ChunkWindow {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// `Content-Range` header value; the range end is inclusive.
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end - 1, total)
    }
}

/// Consecutive windows covering `[0, total)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    total: u64,
    chunk_size: u64,
}

impl ChunkPlan {
    pub fn new(total: u64, chunk_size: u64) -> Self {
        Self {
            total,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.total.div_ceil(self.chunk_size) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn windows(&self) -> impl Iterator<Item = ChunkWindow> + '_ {
        let count = self.len();
        (0..count).map(move |index| {
            let start = index as u64 * self.chunk_size;
            let end = (start + self.chunk_size).min(self.total);
            ChunkWindow {
                index,
                start,
                end,
                is_last: index + 1 == count,
            }
        })
    }
}

/// Progress shown before sending chunk `index` (zero-based) of `count`.
pub fn chunk_progress(index: usize, count: usize) -> u8 {
    if count == 0 {
        return 0;
    }
    (((index + 1) as f64 / count as f64) * CHUNK_PROGRESS_SPAN).round() as u8
}

/// Whether a 2xx chunk reply asks for more ranges. An empty or non-JSON body carries no
/// `nextExpectedRanges`, which means the service holds the whole file.
fn continuation_requested(body: &str) -> bool {
    serde_json::from_str::<ChunkAck>(body)
        .ok()
        .and_then(|ack| ack.next_expected_ranges)
        .is_some()
}

/// How an upload finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOutcome {
    pub bytes_sent: u64,
    pub requests: usize,
    /// The service stopped asking for ranges before the last chunk
    pub completed_early: bool,
}

/// Uploads file bytes to a pre-authorized upload URL.
///
/// No `Authorization` header is sent; the session URL carries its own authorization.
#[derive(Debug, Clone)]
pub struct ChunkedUploader {
    http: Client,
    chunk_size: u64,
    small_file_threshold: u64,
}

impl ChunkedUploader {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            chunk_size: CHUNK_SIZE,
            small_file_threshold: SMALL_FILE_THRESHOLD,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_small_file_threshold(mut self, threshold: u64) -> Self {
        self.small_file_threshold = threshold;
        self
    }

    /// Read a file from disk and upload it.
    pub async fn upload_path(
        &self,
        file: &Path,
        upload_url: &str,
        progress: &dyn UploadProgress,
    ) -> GraphResult<UploadOutcome> {
        let data = tokio::fs::read(file).await?;
        self.upload(Bytes::from(data), upload_url, progress).await
    }

    #[tracing::instrument(skip(self, data, upload_url, progress), fields(size = data.len()))]
    pub async fn upload(
        &self,
        data: Bytes,
        upload_url: &str,
        progress: &dyn UploadProgress,
    ) -> GraphResult<UploadOutcome> {
        let total = data.len() as u64;
        if total == 0 {
            return Err(GraphError::InvalidInput("File is empty".to_string()));
        }

        if total <= self.small_file_threshold {
            progress.report(50, "Uploading...");
            let window = ChunkWindow {
                index: 0,
                start: 0,
                end: total,
                is_last: true,
            };
            self.put_window(upload_url, &data, window, total).await?;
            progress.report(100, "Complete");
            return Ok(UploadOutcome {
                bytes_sent: total,
                requests: 1,
                completed_early: false,
            });
        }

        let plan = ChunkPlan::new(total, self.chunk_size);
        let count = plan.len();
        let mut bytes_sent = 0;

        for window in plan.windows() {
            progress.report(
                chunk_progress(window.index, count),
                &format!("Uploading chunk {}/{}...", window.index + 1, count),
            );

            let response = self.put_window(upload_url, &data, window, total).await?;
            bytes_sent += window.len();

            if window.is_last {
                break;
            }

            let body = response
                .text()
                .await
                .map_err(|e| GraphError::Transport(format!("Failed to read chunk reply: {}", e)))?;
            if !continuation_requested(&body) {
                tracing::debug!(
                    chunk = window.index + 1,
                    chunks = count,
                    "Service reported the upload complete early"
                );
                progress.report(100, "Complete");
                return Ok(UploadOutcome {
                    bytes_sent,
                    requests: window.index + 1,
                    completed_early: true,
                });
            }
        }

        progress.report(100, "Complete");
        tracing::info!(chunks = count, bytes = total, "Chunked upload completed");
        Ok(UploadOutcome {
            bytes_sent,
            requests: count,
            completed_early: false,
        })
    }

    async fn put_window(
        &self,
        upload_url: &str,
        data: &Bytes,
        window: ChunkWindow,
        total: u64,
    ) -> GraphResult<reqwest::Response> {
        let chunk = data.slice(window.start as usize..window.end as usize);
        let response = self
            .http
            .put(upload_url)
            .header(header::CONTENT_RANGE, window.content_range(total))
            .body(chunk)
            .send()
            .await
            .map_err(|e| {
                GraphError::Transport(format!("Upload chunk {} failed: {}", window.index + 1, e))
            })?;

        if !response.status().is_success() {
            let err = error_from_response(response).await;
            tracing::warn!(chunk = window.index + 1, error = %err, "Upload chunk rejected");
            return Err(err);
        }
        Ok(response)
    }
}
