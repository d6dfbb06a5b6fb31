//! Continuation strategy implementations
//!
//! Each strategy handles one pagination pattern.

use super::types::{
    continuation_field, state_mismatch, ContinuationStrategy, NextRequest, PaginationState,
};
use crate::error::{Error, Result};
use crate::http::{Request, Response};

/// Field carrying the next-page link in OData responses
pub const ODATA_NEXT_LINK: &str = "@odata.nextLink";

/// Page size used when fetching every page
pub const DEFAULT_PAGE_SIZE: u64 = 100;

// ============================================================================
// Link Cursor
// ============================================================================

/// Follows a next-page URL found in the response body.
///
/// ```text
/// { "value": [...], "@odata.nextLink": "https://.../messages?$skiptoken=..." }
/// ```
///
/// The link already encodes the query, so the next request is a bare GET to
/// it. An empty page with a link still continues.
#[derive(Debug, Clone)]
pub struct LinkCursor {
    /// Body field holding the next link
    pub next_link_field: String,
    /// Page-size parameter set on the first request
    pub page_size: Option<(String, u64)>,
}

impl LinkCursor {
    /// Follow links stored under `next_link_field`
    pub fn new(next_link_field: impl Into<String>) -> Self {
        Self {
            next_link_field: next_link_field.into(),
            page_size: None,
        }
    }

    /// OData links with `$top=100` on the first request
    pub fn odata() -> Self {
        Self::new(ODATA_NEXT_LINK).with_page_size("$top", DEFAULT_PAGE_SIZE)
    }

    /// Set a page-size parameter on the first request
    #[must_use]
    pub fn with_page_size(mut self, param: impl Into<String>, size: u64) -> Self {
        self.page_size = Some((param.into(), size));
        self
    }
}

impl ContinuationStrategy for LinkCursor {
    fn name(&self) -> &'static str {
        "link_cursor"
    }

    fn initial_state(&self, base: Request) -> Result<(Request, PaginationState)> {
        let request = match &self.page_size {
            Some((param, size)) => base.query(param.clone(), *size),
            None => base,
        };
        Ok((request, PaginationState::link_cursor()))
    }

    fn next_request(
        &self,
        prev: &Request,
        response: &Response,
        _item_count: usize,
        state: PaginationState,
    ) -> Result<(NextRequest, PaginationState)> {
        let mut visited = match state {
            PaginationState::LinkCursor { visited, .. } => visited,
            other => return Err(state_mismatch(self.name(), &other)),
        };

        let Some(link) = continuation_field(response, &self.next_link_field)? else {
            let done = PaginationState::LinkCursor {
                next_url: None,
                visited,
            };
            return Ok((NextRequest::Done, done));
        };

        if !visited.insert(link.clone()) {
            return Err(Error::protocol(format!(
                "server returned an already visited link: {link}"
            )));
        }

        let mut next = Request::get_url(link.clone());
        next.headers = prev.headers.clone();
        next.encoding = prev.encoding;

        let state = PaginationState::LinkCursor {
            next_url: Some(link),
            visited,
        };
        Ok((NextRequest::Continue(next), state))
    }
}

// ============================================================================
// Page Token
// ============================================================================

/// Sends a body-supplied token back as a query parameter.
///
/// ```text
/// { "drives": [...], "nextPageToken": "abc" }  →  GET /drives?pageToken=abc
/// ```
#[derive(Debug, Clone)]
pub struct PageToken {
    /// Body field holding the token
    pub token_field: String,
    /// Query parameter the token is sent in
    pub token_param: String,
    /// Page-size parameter set on every request
    pub page_size: Option<(String, u64)>,
}

impl PageToken {
    /// Read tokens from `token_field`, send them as `token_param`
    pub fn new(token_field: impl Into<String>, token_param: impl Into<String>) -> Self {
        Self {
            token_field: token_field.into(),
            token_param: token_param.into(),
            page_size: None,
        }
    }

    /// `nextPageToken` → `pageToken`, 100 per page
    pub fn google() -> Self {
        Self::new("nextPageToken", "pageToken").with_page_size("pageSize", DEFAULT_PAGE_SIZE)
    }

    /// Set a page-size parameter
    #[must_use]
    pub fn with_page_size(mut self, param: impl Into<String>, size: u64) -> Self {
        self.page_size = Some((param.into(), size));
        self
    }
}

impl ContinuationStrategy for PageToken {
    fn name(&self) -> &'static str {
        "page_token"
    }

    fn initial_state(&self, base: Request) -> Result<(Request, PaginationState)> {
        let request = match &self.page_size {
            Some((param, size)) => base.query(param.clone(), *size),
            None => base,
        };
        Ok((request, PaginationState::page_token()))
    }

    fn next_request(
        &self,
        prev: &Request,
        response: &Response,
        _item_count: usize,
        state: PaginationState,
    ) -> Result<(NextRequest, PaginationState)> {
        let mut seen = match state {
            PaginationState::PageToken { seen, .. } => seen,
            other => return Err(state_mismatch(self.name(), &other)),
        };

        let Some(token) = continuation_field(response, &self.token_field)? else {
            return Ok((NextRequest::Done, PaginationState::PageToken { token: None, seen }));
        };

        if !seen.insert(token.clone()) {
            return Err(Error::protocol(format!(
                "server returned an already used page token: {token}"
            )));
        }

        let next = prev.clone().query(self.token_param.clone(), token.clone());
        let state = PaginationState::PageToken {
            token: Some(token),
            seen,
        };
        Ok((NextRequest::Continue(next), state))
    }
}

// ============================================================================
// Offset Skip
// ============================================================================

/// Offset pagination with a `$top`/`$skip` pair.
///
/// Stops when a page comes back empty. By default a page shorter than `top`
/// also ends the fetch, since the server has nothing left to give; call
/// [`OffsetSkip::until_empty`] to keep asking until an empty page.
#[derive(Debug, Clone)]
pub struct OffsetSkip {
    /// Page size parameter name
    pub top_param: String,
    /// Offset parameter name
    pub skip_param: String,
    /// Page size
    pub top: u64,
    /// Whether a short page ends the fetch
    pub short_page_terminates: bool,
}

impl OffsetSkip {
    /// `$top`/`$skip` pagination with `top` items per page
    pub fn new(top: u64) -> Self {
        Self {
            top_param: "$top".to_string(),
            skip_param: "$skip".to_string(),
            top,
            short_page_terminates: true,
        }
    }

    /// Use different parameter names
    #[must_use]
    pub fn with_params(mut self, top_param: impl Into<String>, skip_param: impl Into<String>) -> Self {
        self.top_param = top_param.into();
        self.skip_param = skip_param.into();
        self
    }

    /// Only an empty page ends the fetch
    #[must_use]
    pub fn until_empty(mut self) -> Self {
        self.short_page_terminates = false;
        self
    }
}

impl Default for OffsetSkip {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ContinuationStrategy for OffsetSkip {
    fn name(&self) -> &'static str {
        "offset_skip"
    }

    fn initial_state(&self, base: Request) -> Result<(Request, PaginationState)> {
        if self.top == 0 {
            return Err(Error::config("offset page size must be greater than zero"));
        }

        let request = base
            .query(self.top_param.clone(), self.top)
            .query(self.skip_param.clone(), 0_u64);
        Ok((
            request,
            PaginationState::OffsetSkip {
                skip: 0,
                top: self.top,
            },
        ))
    }

    fn next_request(
        &self,
        prev: &Request,
        _response: &Response,
        item_count: usize,
        state: PaginationState,
    ) -> Result<(NextRequest, PaginationState)> {
        let (skip, top) = match state {
            PaginationState::OffsetSkip { skip, top } => (skip, top),
            other => return Err(state_mismatch(self.name(), &other)),
        };

        let short = (item_count as u64) < top;
        if item_count == 0 || (self.short_page_terminates && short) {
            return Ok((NextRequest::Done, PaginationState::OffsetSkip { skip, top }));
        }

        let skip = skip + top;
        let next = prev.clone().query(self.skip_param.clone(), skip);
        Ok((NextRequest::Continue(next), PaginationState::OffsetSkip { skip, top }))
    }
}

// ============================================================================
// Single Page
// ============================================================================

/// One request, bounded by a page size.
///
/// Without a parameter name the caller must already have put the bound in
/// the base query.
#[derive(Debug, Clone)]
pub struct SinglePage {
    /// Page size
    pub page_size: u64,
    /// Query parameter the page size is sent in
    pub page_size_param: Option<String>,
}

impl SinglePage {
    /// A single page of `page_size` items
    pub fn new(page_size: u64) -> Self {
        Self {
            page_size,
            page_size_param: None,
        }
    }

    /// Send the page size as `param`
    #[must_use]
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.page_size_param = Some(param.into());
        self
    }
}

impl ContinuationStrategy for SinglePage {
    fn name(&self) -> &'static str {
        "single_page"
    }

    fn initial_state(&self, base: Request) -> Result<(Request, PaginationState)> {
        if self.page_size == 0 {
            return Err(Error::config("page size must be greater than zero"));
        }

        let request = match &self.page_size_param {
            Some(param) => base.query(param.clone(), self.page_size),
            None => base,
        };
        Ok((
            request,
            PaginationState::SinglePage {
                page_size: self.page_size,
            },
        ))
    }

    fn next_request(
        &self,
        _prev: &Request,
        _response: &Response,
        _item_count: usize,
        state: PaginationState,
    ) -> Result<(NextRequest, PaginationState)> {
        Ok((NextRequest::Done, state))
    }
}
