//! Credential context types
//!
//! `AuthConfig` is the runtime credential description after profile
//! templates have been rendered. It deserializes from the `auth` block of a
//! profile (`type: bearer`, `type: oauth2_refresh`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default token endpoint for service-account assertions
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Authentication configuration (after template interpolation)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// Static bearer token
    Bearer {
        /// The bearer token
        token: String,
    },

    /// OAuth2 refresh-token grant
    Oauth2Refresh {
        /// Token endpoint URL
        token_url: String,
        /// Client ID
        client_id: String,
        /// Client secret
        client_secret: String,
        /// Refresh token
        refresh_token: String,
        /// Requested scopes
        #[serde(default)]
        scopes: Vec<String>,
    },

    /// OAuth2 client-credentials grant
    Oauth2ClientCredentials {
        /// Token endpoint URL
        token_url: String,
        /// Client ID
        client_id: String,
        /// Client secret
        client_secret: String,
        /// Requested scopes
        #[serde(default)]
        scopes: Vec<String>,
    },

    /// Service account: a signed JWT assertion exchanged for an access token
    ServiceAccount {
        /// Service account email (`iss` claim)
        client_email: String,
        /// RSA private key in PEM format
        private_key: String,
        /// Requested scopes
        #[serde(default)]
        scopes: Vec<String>,
        /// User to impersonate (`sub` claim)
        #[serde(default)]
        subject: Option<String>,
        /// Token endpoint (`aud` claim)
        #[serde(default = "default_token_url")]
        token_url: String,
    },
}

fn default_token_url() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

impl AuthConfig {
    /// Short name of the credential kind, safe to log
    pub fn kind(&self) -> &'static str {
        match self {
            AuthConfig::None => "none",
            AuthConfig::Bearer { .. } => "bearer",
            AuthConfig::Oauth2Refresh { .. } => "oauth2_refresh",
            AuthConfig::Oauth2ClientCredentials { .. } => "oauth2_client_credentials",
            AuthConfig::ServiceAccount { .. } => "service_account",
        }
    }

    /// Whether this credential obtains tokens that can be cached and dropped
    pub fn is_refreshable(&self) -> bool {
        matches!(
            self,
            AuthConfig::Oauth2Refresh { .. }
                | AuthConfig::Oauth2ClientCredentials { .. }
                | AuthConfig::ServiceAccount { .. }
        )
    }
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self {
            token,
            expires_at: Some(expires_at),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + chrono::Duration::seconds(30) >= expires_at,
            None => false,
        }
    }
}
