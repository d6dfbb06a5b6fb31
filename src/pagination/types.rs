//! Pagination types and traits
//!
//! Defines the continuation strategy abstraction used by the fetcher.

use crate::error::{Error, Result};
use crate::http::{Request, Response};
use serde_json::Value;
use std::collections::HashSet;

/// Result of asking a strategy for the next round
#[derive(Debug, Clone, PartialEq)]
pub enum NextRequest {
    /// Fetch this request next
    Continue(Request),
    /// No more pages
    Done,
}

impl NextRequest {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue(_))
    }
}

/// Strategy-specific pagination state, threaded through the fetch loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationState {
    /// Following links returned in the body
    LinkCursor {
        /// Link the next request will follow
        next_url: Option<String>,
        /// Links already followed
        visited: HashSet<String>,
    },
    /// Sending a body-supplied token back as a query parameter
    PageToken {
        /// Token the next request will carry
        token: Option<String>,
        /// Tokens already sent
        seen: HashSet<String>,
    },
    /// Counting items already fetched
    OffsetSkip {
        /// Items to skip on the current request
        skip: u64,
        /// Page size
        top: u64,
    },
    /// One page, bounded by its size
    SinglePage {
        /// Page size requested by the caller
        page_size: u64,
    },
}

impl PaginationState {
    /// Fresh link-cursor state
    pub fn link_cursor() -> Self {
        Self::LinkCursor {
            next_url: None,
            visited: HashSet::new(),
        }
    }

    /// Fresh page-token state
    pub fn page_token() -> Self {
        Self::PageToken {
            token: None,
            seen: HashSet::new(),
        }
    }

    /// Short name of the variant, for messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LinkCursor { .. } => "link_cursor",
            Self::PageToken { .. } => "page_token",
            Self::OffsetSkip { .. } => "offset_skip",
            Self::SinglePage { .. } => "single_page",
        }
    }
}

/// Decides whether a paginated fetch continues and how.
///
/// Strategies are chosen explicitly by the caller; nothing is inferred from
/// the shape of a response.
pub trait ContinuationStrategy: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Prepare the first request and the starting state
    fn initial_state(&self, base: Request) -> Result<(Request, PaginationState)>;

    /// Look at the latest response and produce the next request, or `Done`
    ///
    /// `item_count` is the number of items extracted from `response`.
    fn next_request(
        &self,
        prev: &Request,
        response: &Response,
        item_count: usize,
        state: PaginationState,
    ) -> Result<(NextRequest, PaginationState)>;

    /// Pull the page's items out of the response
    fn extract_items(&self, response: &Response, items_key: &str) -> Result<Vec<Value>> {
        extract_items(response, items_key)
    }
}

/// Read the items array stored under `items_key`.
///
/// A body that is not JSON, a missing field or a non-array field is a
/// protocol error, never an empty page.
pub fn extract_items(response: &Response, items_key: &str) -> Result<Vec<Value>> {
    let body = response_object(response)?;

    match body.get(items_key) {
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(other) => Err(Error::protocol(format!(
            "items field '{items_key}' is not an array (found {})",
            json_type(other)
        ))),
        None => Err(Error::protocol(format!(
            "response is missing items field '{items_key}'"
        ))),
    }
}

/// Read an optional string continuation field.
///
/// Absent, null and empty all mean "no continuation"; any other non-string
/// value is a protocol error.
pub fn continuation_field(response: &Response, field: &str) -> Result<Option<String>> {
    let body = response_object(response)?;

    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::protocol(format!(
            "continuation field '{field}' is not a string (found {})",
            json_type(other)
        ))),
    }
}

fn response_object(response: &Response) -> Result<&serde_json::Map<String, Value>> {
    match response.json() {
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(Error::protocol(format!(
            "expected a JSON object body, found {}",
            json_type(other)
        ))),
        None => Err(Error::protocol("response has no JSON body")),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Error for a state that does not belong to the strategy handling it
pub(crate) fn state_mismatch(strategy: &str, state: &PaginationState) -> Error {
    Error::protocol(format!(
        "{strategy} strategy cannot continue from {} state",
        state.kind()
    ))
}
