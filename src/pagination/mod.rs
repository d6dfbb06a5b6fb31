//! Pagination module
//!
//! Supports: Link Cursor, Page Token, Offset Skip, Single Page
//!
//! # Overview
//!
//! A `ContinuationStrategy` looks at each response and decides whether there
//! is another page and what request fetches it. `PaginatedFetcher` runs the
//! loop, concatenating items in server order.

mod fetcher;
mod strategies;
mod types;

pub use fetcher::{fetch_all, pages, PaginatedFetcher};
pub use strategies::{
    LinkCursor, OffsetSkip, PageToken, SinglePage, DEFAULT_PAGE_SIZE, ODATA_NEXT_LINK,
};
pub use types::{
    continuation_field, extract_items, ContinuationStrategy, NextRequest, PaginationState,
};
