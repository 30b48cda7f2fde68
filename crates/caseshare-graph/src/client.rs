//! Authenticated Graph requests

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{header, Client, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::models::GraphErrorEnvelope;
use crate::token::AccessToken;

/// Bytes left untouched in path segments: ASCII letters, digits and `. _ ( ) -`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'_')
    .remove(b'(')
    .remove(b')')
    .remove(b'-');

/// Percent-encode one drive path segment (folder or file name).
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Build the HTTP client for token and Graph API requests.
pub fn build_http_client(timeout_secs: u64, connect_timeout_secs: u64) -> GraphResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .build()
        .map_err(|e| GraphError::Transport(format!("Failed to create HTTP client: {}", e)))
}

/// Build the HTTP client for upload-session PUTs.
///
/// Only connecting is bounded: a large body on a slow uplink may take longer than any
/// fixed request budget.
pub fn build_upload_client(connect_timeout_secs: u64) -> GraphResult<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .build()
        .map_err(|e| GraphError::Transport(format!("Failed to create upload client: {}", e)))
}

/// Graph API client bound to one access token.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: Client,
    api_base: String,
    token: AccessToken,
}

impl GraphClient {
    pub fn new(http: Client, api_base: impl Into<String>, token: AccessToken) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// GET a Graph path. The status is not checked; callers decide what counts as success.
    pub async fn get(&self, path: &str) -> GraphResult<Response> {
        let response = self
            .http
            .get(self.url(path))
            .header(header::AUTHORIZATION, self.token.bearer())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| GraphError::Transport(format!("Failed to send GET request: {}", e)))?;
        Ok(response)
    }

    /// POST a JSON body to a Graph path. The status is not checked.
    pub async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> GraphResult<Response> {
        let response = self
            .http
            .post(self.url(path))
            .header(header::AUTHORIZATION, self.token.bearer())
            .json(body)
            .send()
            .await
            .map_err(|e| GraphError::Transport(format!("Failed to send POST request: {}", e)))?;
        Ok(response)
    }
}

/// Turn a non-success Graph reply into [`GraphError::Api`], keeping Graph's error code
/// and message when the body carries them.
pub async fn error_from_response(response: Response) -> GraphError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error body".to_string());

    match serde_json::from_str::<GraphErrorEnvelope>(&body) {
        Ok(envelope) => GraphError::Api {
            status: status.as_u16(),
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) => GraphError::Api {
            status: status.as_u16(),
            code: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: body,
        },
    }
}

/// Deserialize a successful reply, or convert a failed one into an error.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> GraphResult<T> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    response
        .json::<T>()
        .await
        .map_err(|e| GraphError::InvalidResponse(format!("Failed to parse response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header as header_matcher, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("CASE-2024_01"), "CASE-2024_01");
        assert_eq!(encode_segment("My File (1).jpg"), "My%20File%20(1).jpg");
        assert_eq!(encode_segment("a&b#c"), "a%26b%23c");
        assert_eq!(encode_segment("café"), "caf%C3%A9");
    }

    #[tokio::test]
    async fn test_get_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sites/site-1/drives"))
            .and(header_matcher("authorization", "Bearer token-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = GraphClient::new(
            build_http_client(5, 5).expect("client"),
            server.uri(),
            AccessToken::new("token-123"),
        );
        let response = client.get("/sites/site-1/drives").await.expect("request sent");
        assert_eq!(response.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_error_from_response_parses_graph_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {"code": "accessDenied", "message": "Access denied"}
            })))
            .mount(&server)
            .await;

        let response = reqwest::get(server.uri()).await.expect("request sent");
        match error_from_response(response).await {
            GraphError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 403);
                assert_eq!(code, "accessDenied");
                assert_eq!(message, "Access denied");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_from_response_plain_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let response = reqwest::get(server.uri()).await.expect("request sent");
        match error_from_response(response).await {
            GraphError::Api { status, message, .. } => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream down");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }
}
