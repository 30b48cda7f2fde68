//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that converts into
//! `AppError` (Graph errors, validation errors) converts into `HttpAppError` as well and
//! renders as an [`ErrorResponse`] with the matching status.

use axum::{
    extract::multipart::MultipartError,
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use caseshare_core::{AppError, ErrorMetadata, LogLevel, ValidationError};
use caseshare_graph::GraphError;
use serde::de::DeserializeOwned;

pub use caseshare_infra::ErrorResponse;

/// Wrapper that lets `AppError` implement `IntoResponse` in this crate
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<GraphError> for HttpAppError {
    fn from(err: GraphError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Failed to read multipart: {}",
            err.body_text()
        )))
    }
}

/// JSON body deserialization failures become a 400 in our error format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// `Json<T>` that rejects with [`ErrorResponse`] instead of axum's plain-text body.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

/// Body for an error; details are hidden in production and for sensitive errors.
pub fn error_body(app_error: &AppError, is_production: bool) -> ErrorResponse {
    let mut body = ErrorResponse::new(app_error.client_message());
    body.code = Some(app_error.error_code().to_string());
    body.recoverable = Some(app_error.is_recoverable());
    body.suggested_action = app_error.suggested_action().map(String::from);

    if !is_production && !app_error.is_sensitive() {
        body.details = Some(app_error.detailed_message());
        body.error_type = Some(app_error.error_type().to_string());
    }
    body
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (status, Json(error_body(app_error, is_production_env()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let err = AppError::Conflict("Folder 'CASE-1' already exists".to_string());
        let body = serde_json::to_value(error_body(&err, false)).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "CONFLICT");
        assert_eq!(body["recoverable"], false);
        assert!(body["error"].as_str().unwrap().contains("CASE-1"));
        assert!(body.get("details").is_some());
    }

    #[test]
    fn test_production_hides_details() {
        let err = AppError::Validation("Too many files".to_string());
        let body = serde_json::to_value(error_body(&err, true)).unwrap();
        assert!(body.get("details").is_none());
        assert!(body.get("error_type").is_none());
    }

    #[test]
    fn test_sensitive_errors_hide_details() {
        let err = AppError::Authentication("HTTP 401: AADSTS7000215".to_string());
        let body = serde_json::to_value(error_body(&err, false)).unwrap();
        assert!(body.get("details").is_none());
        assert!(!body["error"].as_str().unwrap().contains("AADSTS"));
    }

    #[test]
    fn test_graph_error_status_mapping() {
        let cases = [
            (GraphError::Conflict("A".into()), StatusCode::CONFLICT),
            (
                GraphError::NoSuitableDrive("site".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                GraphError::Authentication("nope".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                GraphError::InvalidInput("Folder name is required".into()),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, expected) in cases {
            let response = HttpAppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_file_too_large_is_413() {
        let err = ValidationError::FileTooLarge {
            name: "clip.mp4".to_string(),
            size: 60 * 1024 * 1024,
            max: 50 * 1024 * 1024,
        };
        let response = HttpAppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
