//! API constants

/// API version segment
pub const API_VERSION: &str = "v0";

/// Prefix of every versioned route
pub const API_PREFIX: &str = "/api/v0";

/// Path of the served OpenAPI document
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Multipart framing allowance on top of the configured batch size
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// In-flight request cap unless `HTTP_CONCURRENCY_LIMIT` says otherwise
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 256;
