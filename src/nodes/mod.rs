//! Node operations
//!
//! The operations of the two API families, expressed over the fetcher and
//! the assembler. Each takes already-validated option values.

pub mod drive;
pub mod outlook;

use crate::error::Result;
use crate::http::{HttpCaller, Request};
use crate::pagination::{ContinuationStrategy, PaginatedFetcher, SinglePage};
use serde_json::Value;

/// Default number of items returned when not fetching everything
pub const DEFAULT_LIMIT: u64 = 50;

/// How many items a list operation returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Fetch every page
    pub return_all: bool,
    /// Page size bound when `return_all` is off
    pub limit: u64,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            return_all: false,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListOptions {
    /// Fetch every page
    pub fn all() -> Self {
        Self {
            return_all: true,
            ..Self::default()
        }
    }

    /// A single page of at most `limit` items
    pub fn limit(limit: u64) -> Self {
        Self {
            return_all: false,
            limit,
        }
    }
}

/// Run a list operation: `all` strategy when returning everything, otherwise
/// one page bounded by `limit` in `limit_param`.
async fn list(
    caller: &dyn HttpCaller,
    options: ListOptions,
    all: &dyn ContinuationStrategy,
    limit_param: &str,
    base: Request,
    items_key: &str,
) -> Result<Vec<Value>> {
    let fetcher = PaginatedFetcher::new();
    if options.return_all {
        fetcher.fetch_all(caller, all, base, items_key).await
    } else {
        let single = SinglePage::new(options.limit).with_param(limit_param);
        fetcher.fetch_all(caller, &single, base, items_key).await
    }
}
