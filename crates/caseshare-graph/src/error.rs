//! Graph error types

use caseshare_core::AppError;
use thiserror::Error;

/// Errors raised while talking to Microsoft Graph
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("No suitable document library found on site {0}")]
    NoSuitableDrive(String),

    #[error("Folder '{0}' already exists")]
    Conflict(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Graph API request failed with status {status}: {code} - {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Graph operations
pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    /// HTTP status returned by Graph, when the failure came from a reply.
    pub fn status(&self) -> Option<u16> {
        match self {
            GraphError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GraphError {
    fn from(err: reqwest::Error) -> Self {
        GraphError::Transport(err.to_string())
    }
}

impl From<GraphError> for AppError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Authentication(msg) => AppError::Authentication(msg),
            GraphError::NoSuitableDrive(_) => {
                AppError::Resolution("No suitable document library found".to_string())
            }
            GraphError::Conflict(folder) => {
                AppError::Conflict(format!("Folder '{}' already exists", folder))
            }
            GraphError::Transport(msg) => AppError::Transport(msg),
            GraphError::Api {
                status,
                code,
                message,
            } => AppError::Upstream {
                status,
                code,
                message,
            },
            GraphError::InvalidResponse(msg) => {
                AppError::Transport(format!("Unexpected response from SharePoint: {}", msg))
            }
            GraphError::InvalidInput(msg) => AppError::InvalidInput(msg),
            GraphError::Io(err) => AppError::Internal(format!("IO error: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caseshare_core::ErrorMetadata;

    #[test]
    fn test_conflict_maps_to_409() {
        let app: AppError = GraphError::Conflict("CASE-1".to_string()).into();
        assert_eq!(app.http_status_code(), 409);
        assert_eq!(app.client_message(), "Folder 'CASE-1' already exists");
    }

    #[test]
    fn test_no_drive_maps_to_resolution() {
        let app: AppError = GraphError::NoSuitableDrive("site-1".to_string()).into();
        match app {
            AppError::Resolution(msg) => assert_eq!(msg, "No suitable document library found"),
            other => panic!("Expected Resolution variant, got {other:?}"),
        }
    }

    #[test]
    fn test_api_error_keeps_status() {
        let err = GraphError::Api {
            status: 403,
            code: "accessDenied".to_string(),
            message: "Nope".to_string(),
        };
        assert_eq!(err.status(), Some(403));
        let app: AppError = err.into();
        assert!(matches!(app, AppError::Upstream { status: 403, .. }));
    }
}
