//! Full materialization of paged remote collections.
//!
//! Two strategies cover the APIs in use: page-number paging that stops on a
//! short page, and cursor paging that follows an opaque "next" link until the
//! server stops returning one. Every page request waits on the rate limiter
//! first. Results keep server order.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ApiError;
use crate::rate_limit::RateLimiter;

/// One page of a cursor-paged collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPage<T, C> {
    pub items: Vec<T>,
    /// Cursor for the following page; `None` on the last page.
    pub next: Option<C>,
}

/// Fetches pages `1, 2, ...` until one returns fewer than `page_size` items.
///
/// `page_size` must be non-zero.
pub async fn fetch_by_page<T, F, Fut>(
    limiter: &RateLimiter,
    cancel: &CancellationToken,
    page_size: usize,
    mut fetch_page: F,
) -> Result<Vec<T>, ApiError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ApiError>>,
{
    let page_size = page_size.max(1);
    let mut all = Vec::new();
    let mut page = 1_u32;

    loop {
        limiter.wait_if_needed(cancel).await?;
        let items = fetch_page(page).await?;
        let count = items.len();
        debug!(page, count, "fetched page");
        all.extend(items);

        if count < page_size {
            break;
        }
        page = page
            .checked_add(1)
            .ok_or_else(|| ApiError::InvalidResponse("page counter overflowed".to_string()))?;
    }

    Ok(all)
}

/// Fetches the first page with `None`, then follows `next` until it is absent.
pub async fn fetch_by_cursor<T, C, F, Fut>(
    limiter: &RateLimiter,
    cancel: &CancellationToken,
    mut fetch_page: F,
) -> Result<Vec<T>, ApiError>
where
    F: FnMut(Option<C>) -> Fut,
    Fut: Future<Output = Result<CursorPage<T, C>, ApiError>>,
{
    let mut all = Vec::new();
    let mut cursor = None;
    let mut pages = 0_usize;

    loop {
        limiter.wait_if_needed(cancel).await?;
        let page = fetch_page(cursor).await?;
        pages += 1;
        debug!(page = pages, count = page.items.len(), "fetched cursor page");
        all.extend(page.items);

        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(all)
}
