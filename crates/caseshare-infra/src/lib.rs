//! Caseshare Infrastructure Library
//!
//! Shared pieces used by the caseshare services:
//! - Middleware (request ID, security headers)
//! - Tracing initialization
//! - The JSON error body returned by HTTP endpoints

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod error;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{
    get_request_id, request_id_middleware, security_headers_middleware, RequestId,
};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, LogFormat};

pub use error::ErrorResponse;
