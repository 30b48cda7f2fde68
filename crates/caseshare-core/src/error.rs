//! Error types module
//!
//! All failures surfaced to a caller are unified under [`AppError`]. The variants follow
//! the upload pipeline: configuration, authentication against the identity provider,
//! drive resolution, folder conflicts, transport failures, batch validation, and
//! non-success replies from the storage backend.

use std::io;

/// Severity used when an error is logged at the HTTP boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Caller mistakes: bad batches, missing case ids
    Debug,
    /// Backend trouble worth watching: conflicts, timeouts, upstream replies
    Warn,
    /// Misconfiguration, rejected credentials, bugs
    Error,
}

/// How an error is rendered to a client and logged.
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Stable code such as `AUTHENTICATION_FAILED` or `CONFLICT`
    fn error_code(&self) -> &'static str;

    /// True when submitting the same request later may succeed
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Message safe to show to the person uploading
    fn client_message(&self) -> String;

    /// Sensitive errors never expose their details, in any environment
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Drive resolution failed: {0}")]
    Resolution(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Upstream request failed with status {status}: {code} - {message}")]
    Upstream {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<crate::validation::ValidationError> for AppError {
    fn from(err: crate::validation::ValidationError) -> Self {
        use crate::validation::ValidationError;
        match err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            other => AppError::Validation(other.to_string()),
        }
    }
}

/// (status, code, recoverable, suggested action, sensitive, log level) per variant
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Configuration(_) => (
            500,
            "CONFIGURATION_ERROR",
            false,
            Some("Contact the administrator to fix the SharePoint configuration"),
            true,
            LogLevel::Error,
        ),
        AppError::Authentication(_) => (
            502,
            "AUTHENTICATION_FAILED",
            false,
            Some("Check the SharePoint application credentials"),
            true,
            LogLevel::Error,
        ),
        AppError::Resolution(_) => (
            404,
            "NO_SUITABLE_LIBRARY",
            false,
            Some("Verify the document library exists on the configured site"),
            false,
            LogLevel::Warn,
        ),
        AppError::Conflict(_) => (
            409,
            "CONFLICT",
            false,
            Some("Reload and try again; the folder was created concurrently"),
            false,
            LogLevel::Warn,
        ),
        AppError::Transport(_) => (
            502,
            "TRANSPORT_ERROR",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Warn,
        ),
        AppError::Validation(_) => (
            400,
            "VALIDATION_ERROR",
            false,
            Some("Fix the listed files and submit again"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size or split the batch"),
            false,
            LogLevel::Debug,
        ),
        AppError::Upstream { .. } => (
            502,
            "UPSTREAM_ERROR",
            false,
            None,
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Variant name, reported as `error_type` outside production
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Configuration(_) => "Configuration",
            AppError::Authentication(_) => "Authentication",
            AppError::Resolution(_) => "Resolution",
            AppError::Conflict(_) => "Conflict",
            AppError::Transport(_) => "Transport",
            AppError::Validation(_) => "Validation",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Upstream { .. } => "Upstream",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Display text followed by the source chain, capped in depth
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Configuration(_) => "SharePoint integration is not configured".to_string(),
            AppError::Authentication(_) => {
                "Authentication failed - check your SharePoint configuration".to_string()
            }
            AppError::Resolution(ref msg) => msg.clone(),
            AppError::Conflict(ref msg) => msg.clone(),
            AppError::Transport(ref msg) => format!("Connection error: {}", msg),
            AppError::Validation(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Upstream {
                status,
                code,
                message,
            } => format!("SharePoint request failed (HTTP {}): {} - {}", status, code, message),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    #[test]
    fn test_error_metadata_authentication() {
        let err = AppError::Authentication("invalid_client".to_string());
        assert_eq!(err.http_status_code(), 502);
        assert_eq!(err.error_code(), "AUTHENTICATION_FAILED");
        assert!(!err.is_recoverable());
        assert_eq!(
            err.client_message(),
            "Authentication failed - check your SharePoint configuration"
        );
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_conflict() {
        let err = AppError::Conflict("Folder 'CASE-1' already exists".to_string());
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "CONFLICT");
        assert_eq!(err.client_message(), "Folder 'CASE-1' already exists");
        assert!(!err.is_sensitive());
    }

    #[test]
    fn test_error_metadata_upstream_carries_code_and_message() {
        let err = AppError::Upstream {
            status: 403,
            code: "accessDenied".to_string(),
            message: "Access denied".to_string(),
        };
        assert_eq!(err.http_status_code(), 502);
        let msg = err.client_message();
        assert!(msg.contains("403"));
        assert!(msg.contains("accessDenied"));
        assert!(msg.contains("Access denied"));
        assert_eq!(err.suggested_action(), None);
    }

    #[test]
    fn test_error_metadata_transport_is_recoverable() {
        let err = AppError::Transport("connection reset".to_string());
        assert!(err.is_recoverable());
        assert_eq!(err.suggested_action(), Some("Retry after a short delay"));
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_from_validation_error() {
        let err: AppError = ValidationError::TooManyFiles { count: 6, max: 5 }.into();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let err: AppError = ValidationError::FileTooLarge {
            name: "clip.mp4".to_string(),
            size: 100,
            max: 10,
        }
        .into();
        assert_eq!(err.http_status_code(), 413);
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let err = AppError::from(anyhow::anyhow!("root cause").context("outer"));
        let details = err.detailed_message();
        assert!(details.contains("Internal error with source"));
        assert!(details.contains("Caused by"));
    }
}
