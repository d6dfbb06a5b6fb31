//! Authentication module
//!
//! Supports: Bearer, OAuth2 (refresh token, client credentials), service
//! account JWT assertions.
//!
//! The transport only sees the `Credentials` trait; `Authenticator` is the
//! implementation backed by an `AuthConfig` and a token cache.

mod authenticator;
mod types;

pub use authenticator::{Authenticator, Credentials};
pub use types::{AuthConfig, CachedToken, GOOGLE_TOKEN_URL};
