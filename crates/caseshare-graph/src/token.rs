//! App-only access tokens (OAuth 2.0 client credentials)

use async_trait::async_trait;
use caseshare_core::config::GraphConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::client::build_http_client;
use crate::error::{GraphError, GraphResult};
use crate::models::TokenResponse;

pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Bearer token for Graph requests
#[derive(Debug, Clone)]
pub struct AccessToken {
    secret: SecretString,
    expires_in: Option<u64>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            secret: SecretString::from(token.into()),
            expires_in: None,
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.secret.expose_secret())
    }

    /// Lifetime in seconds as reported by the identity provider.
    pub fn expires_in(&self) -> Option<u64> {
        self.expires_in
    }
}

/// Source of access tokens
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> GraphResult<AccessToken>;
}

/// Token endpoint client for the client-credentials grant.
///
/// A new token is requested on every call; nothing is cached between requests.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: SecretString,
}

impl ClientCredentials {
    pub fn new(config: &GraphConfig) -> GraphResult<Self> {
        let http = build_http_client(config.timeout_secs, config.connect_timeout_secs)?;
        Ok(Self {
            http,
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                config.login_base.trim_end_matches('/'),
                config.tenant_id
            ),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

#[async_trait]
impl TokenProvider for ClientCredentials {
    #[tracing::instrument(skip(self), fields(client_id = %self.client_id))]
    async fn access_token(&self) -> GraphResult<AccessToken> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("scope", GRAPH_SCOPE),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Token request could not be sent");
                GraphError::Authentication(format!("Token request failed: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            GraphError::Authentication(format!("Failed to read token response: {}", e))
        })?;

        if body.trim().is_empty() {
            tracing::error!(status = status.as_u16(), "Empty token response");
            return Err(GraphError::Authentication(format!(
                "Empty token response (HTTP {})",
                status.as_u16()
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(status = status.as_u16(), error = %e, "Token response is not JSON");
            GraphError::Authentication(format!("Invalid token response: {}", e))
        })?;

        if status.as_u16() != 200 {
            let reason = parsed
                .error_description
                .or(parsed.error)
                .unwrap_or_else(|| "no error description".to_string());
            tracing::error!(status = status.as_u16(), reason = %reason, "Token request rejected");
            return Err(GraphError::Authentication(format!(
                "HTTP {}: {}",
                status.as_u16(),
                reason
            )));
        }

        let token = parsed.access_token.filter(|t| !t.is_empty()).ok_or_else(|| {
            tracing::error!("Token response has no access_token");
            GraphError::Authentication("No access_token in response".to_string())
        })?;

        tracing::debug!(token_len = token.len(), "Access token acquired");
        Ok(AccessToken {
            secret: SecretString::from(token),
            expires_in: parsed.expires_in,
        })
    }
}

/// Fixed token, for callers that obtained a token elsewhere.
#[derive(Debug, Clone)]
pub struct StaticToken(pub AccessToken);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> GraphResult<AccessToken> {
        Ok(self.0.clone())
    }
}
