//! Authenticator implementation
//!
//! Injects credentials into outgoing requests and keeps the access token
//! cache for the refreshable credential kinds.

use super::types::{AuthConfig, CachedToken};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Lifetime requested for service-account assertions, in seconds
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Credential context consulted by the transport on every call
#[async_trait]
pub trait Credentials: Send + Sync {
    /// Sign a request before it is sent
    async fn authorize(&self, req: RequestBuilder) -> Result<RequestBuilder>;

    /// Forget any cached token after the server rejected it
    async fn invalidate(&self) {}
}

/// Applies an `AuthConfig` to HTTP requests
pub struct Authenticator {
    config: AuthConfig,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create an authenticator that uses `http_client` for token requests
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Drop the cached token so the next call fetches a fresh one
    pub async fn clear_cache(&self) {
        *self.cached_token.write().await = None;
    }

    /// Get a valid token, refreshing if necessary
    async fn access_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
                return Ok(token.token.clone());
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.token.clone());
        }

        debug!(kind = self.config.kind(), "Fetching access token");
        let fresh = self.fetch_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    async fn fetch_token(&self) -> Result<CachedToken> {
        match &self.config {
            AuthConfig::Oauth2Refresh {
                token_url,
                client_id,
                client_secret,
                refresh_token,
                scopes,
            } => {
                let mut form = vec![
                    ("grant_type", "refresh_token".to_string()),
                    ("client_id", client_id.clone()),
                    ("client_secret", client_secret.clone()),
                    ("refresh_token", refresh_token.clone()),
                ];
                if !scopes.is_empty() {
                    form.push(("scope", scopes.join(" ")));
                }
                self.exchange(token_url, &form).await
            }

            AuthConfig::Oauth2ClientCredentials {
                token_url,
                client_id,
                client_secret,
                scopes,
            } => {
                let mut form = vec![
                    ("grant_type", "client_credentials".to_string()),
                    ("client_id", client_id.clone()),
                    ("client_secret", client_secret.clone()),
                ];
                if !scopes.is_empty() {
                    form.push(("scope", scopes.join(" ")));
                }
                self.exchange(token_url, &form).await
            }

            AuthConfig::ServiceAccount {
                client_email,
                private_key,
                scopes,
                subject,
                token_url,
            } => {
                let assertion = sign_assertion(
                    client_email,
                    private_key,
                    scopes,
                    subject.as_deref(),
                    token_url,
                )?;
                let form = vec![
                    (
                        "grant_type",
                        "urn:ietf:params:oauth:grant-type:jwt-bearer".to_string(),
                    ),
                    ("assertion", assertion),
                ];
                self.exchange(token_url, &form).await
            }

            AuthConfig::None | AuthConfig::Bearer { .. } => Err(Error::auth(
                "Token refresh not supported for this credential type",
            )),
        }
    }

    /// POST a token request form and parse the standard token response
    async fn exchange(&self, token_url: &str, form: &[(&str, String)]) -> Result<CachedToken> {
        let response = self.http_client.post(token_url).form(form).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenRefresh {
                message: format!("Token request failed with status {status}: {body}"),
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.into_cached_token())
    }
}

#[async_trait]
impl Credentials for Authenticator {
    async fn authorize(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        match &self.config {
            AuthConfig::None => Ok(req),
            AuthConfig::Bearer { token } => Ok(req.bearer_auth(token)),
            _ => {
                let token = self.access_token().await.map_err(|e| match e {
                    Error::TokenRefresh { .. } | Error::JwtGeneration { .. } => {
                        Error::auth(e.to_string())
                    }
                    other => other,
                })?;
                Ok(req.bearer_auth(token))
            }
        }
    }

    async fn invalidate(&self) {
        if self.config.is_refreshable() {
            self.clear_cache().await;
        }
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("kind", &self.config.kind())
            .finish_non_exhaustive()
    }
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_cached_token(self) -> CachedToken {
        match self.expires_in {
            Some(secs) => CachedToken::expires_in(self.access_token, secs),
            None => CachedToken::new(self.access_token, None),
        }
    }
}

/// Claims of a service-account assertion
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<&'a str>,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Build and sign the RS256 JWT a service account trades for a token
fn sign_assertion(
    client_email: &str,
    private_key: &str,
    scopes: &[String],
    subject: Option<&str>,
    token_url: &str,
) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = AssertionClaims {
        iss: client_email,
        sub: subject,
        scope: scopes.join(" "),
        aud: token_url,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };

    // Keys pasted from JSON key files keep their escaped newlines
    let pem = private_key.replace("\\n", "\n");
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| Error::JwtGeneration {
        message: format!("Invalid private key: {e}"),
    })?;

    encode(&Header::new(Algorithm::RS256), &claims, &key).map_err(|e| Error::JwtGeneration {
        message: format!("Failed to encode JWT: {e}"),
    })
}
