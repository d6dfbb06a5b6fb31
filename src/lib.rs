// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pagekit
//!
//! Paginated REST fetches with pluggable continuation strategies, and the
//! shared-drive and mail operations built on them.
//!
//! ## Features
//!
//! - **Continuation Strategies**: Link cursor, page token, offset/skip, single page
//! - **Transport**: One call per request, credential injection, refined error messages
//! - **Credentials**: Bearer, OAuth2 refresh and client credentials, service accounts
//! - **Attachments**: Per-record binary downloads assembled as labeled payloads
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagekit::http::{HttpCallerConfig, Request, RestCaller};
//! use pagekit::pagination::{fetch_all, LinkCursor};
//! use pagekit::{AuthConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = HttpCallerConfig::builder()
//!         .base_url("https://graph.microsoft.com/v1.0/me")
//!         .build();
//!     let caller = RestCaller::with_auth(config, AuthConfig::Bearer { token: "...".into() })?;
//!
//!     let messages = fetch_all(&caller, &LinkCursor::odata(), Request::get("/messages"), "value").await?;
//!     println!("{} messages", messages.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 Node operations / CLI                        │
//! │  list_drives  delete_drive  list_messages  get_mime_content  │
//! └──────────────────────────────────────────────────────────────┘
//!                  │                           │
//! ┌────────────────┴─────────┐   ┌─────────────┴────────────────┐
//! │    PaginatedFetcher      │◄──│     AttachmentAssembler      │
//! │  + ContinuationStrategy  │   │  labeled BinaryPayloads      │
//! └────────────────┬─────────┘   └─────────────┬────────────────┘
//!                  │                           │
//! ┌────────────────┴───────────────────────────┴────────────────┐
//! │  HttpCaller (RestCaller): rate limit, credentials, errors   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Credential contexts and token acquisition
pub mod auth;

/// Single-call HTTP transport with rate limiting
pub mod http;

/// Continuation strategies and the paginated fetcher
pub mod pagination;

/// Attachment download and binary payload assembly
pub mod attachments;

/// Shared-drive and mail operations
pub mod nodes;

/// Profile configuration
pub mod config;

/// Template interpolation
pub mod template;

/// Built-in API profiles
pub mod profiles;

/// Command-line interface
pub mod cli;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use auth::AuthConfig;
pub use config::{load_profile, load_profile_from_str, ProfileConfig};
pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
