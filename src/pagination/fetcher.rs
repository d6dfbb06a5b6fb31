//! Paginated fetch loop
//!
//! Drives an `HttpCaller` with a `ContinuationStrategy` until the strategy
//! says it is done. Pages are concatenated in server order; nothing is
//! reordered, deduplicated or retried.

use super::types::{ContinuationStrategy, NextRequest, PaginationState};
use crate::error::{Error, Result};
use crate::http::{HttpCaller, Request};
use futures::stream::{self, Stream, TryStreamExt};
use serde_json::Value;
use tracing::{debug, info};

/// Fetches every page of a list endpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct PaginatedFetcher {
    max_items: Option<usize>,
}

impl PaginatedFetcher {
    /// A fetcher without an item ceiling
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop requesting pages once at least `max_items` items are held.
    ///
    /// The page that crosses the ceiling is kept whole; callers that need an
    /// exact count truncate the result themselves.
    #[must_use]
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Configured item ceiling
    pub fn max_items(&self) -> Option<usize> {
        self.max_items
    }

    /// Fetch and concatenate all pages.
    ///
    /// The first failing call or malformed page aborts the fetch and no
    /// partial result is returned.
    pub async fn fetch_all(
        &self,
        caller: &dyn HttpCaller,
        strategy: &dyn ContinuationStrategy,
        base: Request,
        items_key: &str,
    ) -> Result<Vec<Value>> {
        let pages = pages(caller, strategy, base, items_key);
        futures::pin_mut!(pages);

        let mut items = Vec::new();
        let mut page_count = 0_usize;

        while let Some(page) = pages.try_next().await? {
            page_count += 1;
            items.extend(page);

            if self.max_items.is_some_and(|max| items.len() >= max) {
                debug!(
                    strategy = strategy.name(),
                    total = items.len(),
                    "Item ceiling reached, not requesting more pages"
                );
                break;
            }
        }

        info!(
            strategy = strategy.name(),
            pages = page_count,
            items = items.len(),
            "Paginated fetch complete"
        );
        Ok(items)
    }
}

/// Fetch all pages with a default fetcher
pub async fn fetch_all(
    caller: &dyn HttpCaller,
    strategy: &dyn ContinuationStrategy,
    base: Request,
    items_key: &str,
) -> Result<Vec<Value>> {
    PaginatedFetcher::new()
        .fetch_all(caller, strategy, base, items_key)
        .await
}

/// Where the page stream stands between polls
enum Cursor {
    Start(Request),
    Next(Request, PaginationState),
    Finished,
}

/// Lazily fetch pages one at a time.
///
/// Each item of the stream is the item list of one page. The stream ends
/// when the strategy is done and yields at most one error. It cannot be
/// resumed; start a new one to fetch again.
pub fn pages<'a>(
    caller: &'a dyn HttpCaller,
    strategy: &'a dyn ContinuationStrategy,
    base: Request,
    items_key: &'a str,
) -> impl Stream<Item = Result<Vec<Value>>> + 'a {
    stream::try_unfold(Cursor::Start(base), move |cursor| async move {
        let (request, state) = match cursor {
            Cursor::Start(base) => strategy.initial_state(base)?,
            Cursor::Next(request, state) => (request, state),
            Cursor::Finished => return Ok::<_, Error>(None),
        };

        let response = caller.call(&request).await?;
        let items = strategy.extract_items(&response, items_key)?;
        debug!(
            strategy = strategy.name(),
            target = %request.target,
            count = items.len(),
            "Fetched page"
        );

        let (next, state) = strategy.next_request(&request, &response, items.len(), state)?;
        let cursor = match next {
            NextRequest::Continue(request) => Cursor::Next(request, state),
            NextRequest::Done => Cursor::Finished,
        };
        Ok(Some((items, cursor)))
    })
}
