//! HTTP transport module
//!
//! # Features
//!
//! - **HttpCaller**: one request, one round trip, no implicit retry
//! - **RestCaller**: `reqwest` implementation with credential injection
//! - **Rate Limiting**: optional token bucket pacing using governor
//! - **Error Translation**: 401 → auth, other non-2xx → status with a
//!   refined message, connection/timeout → network

mod client;
mod rate_limit;
mod types;

pub use client::{HttpCaller, HttpCallerConfig, HttpCallerConfigBuilder, RestCaller};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use types::{Encoding, Request, Response, ResponseBody, Target};
