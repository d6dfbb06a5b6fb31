//! Single-call transport
//!
//! `HttpCaller` is the seam every other component talks through: one
//! request in, one response (or one error) out. `RestCaller` is the
//! `reqwest` implementation. It resolves targets against a base URL,
//! injects credentials, waits on the rate limiter and translates failures:
//!
//! - 401 → `Error::Auth` (and the credential cache is dropped)
//! - any other non-2xx → `Error::HttpStatus` with a refined message
//! - connection, timeout, body read → `Error::Network`
//!
//! There is no retry here. A failed call fails.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::types::{Encoding, Request, Response, ResponseBody, Target};
use crate::auth::{AuthConfig, Authenticator, Credentials};
use crate::error::{body_description, Error, Result};
use crate::types::StringMap;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Issues exactly one HTTP round trip per call
#[async_trait]
pub trait HttpCaller: Send + Sync {
    /// Send `request` and return the parsed response
    async fn call(&self, request: &Request) -> Result<Response>;
}

#[async_trait]
impl<T: HttpCaller + ?Sized> HttpCaller for Arc<T> {
    async fn call(&self, request: &Request) -> Result<Response> {
        (**self).call(request).await
    }
}

/// Configuration for the REST caller
#[derive(Debug, Clone)]
pub struct HttpCallerConfig {
    /// Base URL that path targets are appended to
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Headers sent with every request
    pub default_headers: StringMap,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpCallerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: Duration::from_secs(30),
            rate_limit: None,
            default_headers: StringMap::new(),
            user_agent: format!("pagekit/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpCallerConfig {
    /// Create a new config builder
    pub fn builder() -> HttpCallerConfigBuilder {
        HttpCallerConfigBuilder::default()
    }
}

/// Builder for `HttpCallerConfig`
#[derive(Default)]
pub struct HttpCallerConfigBuilder {
    config: HttpCallerConfig,
}

impl HttpCallerConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Pace calls with a token bucket
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpCallerConfig {
        self.config
    }
}

/// `reqwest`-backed `HttpCaller`
pub struct RestCaller {
    client: Client,
    config: HttpCallerConfig,
    credentials: Arc<dyn Credentials>,
    rate_limiter: Option<RateLimiter>,
}

impl RestCaller {
    /// Create an unauthenticated caller
    pub fn new(config: HttpCallerConfig) -> Result<Self> {
        let client = build_client(&config)?;
        let credentials = Arc::new(Authenticator::with_client(AuthConfig::None, client.clone()));
        Ok(Self::assemble(client, config, credentials))
    }

    /// Create a caller that signs requests with `auth`
    pub fn with_auth(config: HttpCallerConfig, auth: AuthConfig) -> Result<Self> {
        let client = build_client(&config)?;
        let credentials = Arc::new(Authenticator::with_client(auth, client.clone()));
        Ok(Self::assemble(client, config, credentials))
    }

    /// Create a caller around an externally supplied credential context
    pub fn with_credentials(
        config: HttpCallerConfig,
        credentials: Arc<dyn Credentials>,
    ) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self::assemble(client, config, credentials))
    }

    fn assemble(
        client: Client,
        config: HttpCallerConfig,
        credentials: Arc<dyn Credentials>,
    ) -> Self {
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);
        Self {
            client,
            config,
            credentials,
            rate_limiter,
        }
    }

    /// Base URL this caller resolves paths against
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Resolve a target to an absolute URL
    pub fn resolve(&self, target: &Target) -> Result<Url> {
        match target {
            Target::Url(url) => Ok(Url::parse(url)?),
            Target::Path(path) => {
                let base = self.config.base_url.trim_end_matches('/');
                if base.is_empty() {
                    return Err(Error::config(format!(
                        "No base URL configured for path '{path}'"
                    )));
                }
                let path = path.trim_start_matches('/');
                Ok(Url::parse(&format!("{base}/{path}"))?)
            }
        }
    }
}

#[async_trait]
impl HttpCaller for RestCaller {
    async fn call(&self, request: &Request) -> Result<Response> {
        let url = self.resolve(&request.target)?;

        if let Some(limiter) = &self.rate_limiter {
            limiter.wait().await;
        }

        let mut req = self
            .client
            .request(request.method.into(), url.clone())
            .timeout(self.config.timeout);

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if !request.query.is_empty() {
            let pairs: Vec<(String, String)> = request
                .query
                .iter()
                .flat_map(|(key, value)| value.to_pairs(key))
                .collect();
            req = req.query(&pairs);
        }

        if let Some(body) = request.wire_body() {
            req = req.json(body);
        }

        let req = self.credentials.authorize(req).await?;

        debug!(method = %request.method, url = %url, "Sending request");
        let response = req.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, "Credential rejected, dropping cached token");
            self.credentials.invalidate().await;
            let message = body_description(&body).unwrap_or_else(|| "Unauthorized".to_string());
            return Err(Error::auth(message));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let headers: StringMap = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = match request.encoding {
            Encoding::Binary => ResponseBody::Binary(response.bytes().await?),
            Encoding::Json => {
                let text = response.text().await?;
                if text.trim().is_empty() {
                    ResponseBody::Empty
                } else {
                    ResponseBody::Json(serde_json::from_str(&text)?)
                }
            }
        };

        debug!(method = %request.method, url = %url, status = status.as_u16(), "Request succeeded");
        Ok(Response {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for RestCaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestCaller")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

fn build_client(config: &HttpCallerConfig) -> Result<Client> {
    Ok(Client::builder()
        .timeout(config.timeout)
        .user_agent(&config.user_agent)
        .build()?)
}
