//! Page-walking over GitHub's paginated list endpoints.
//!
//! Pages are requested one at a time starting from page 1. Rate-limited
//! requests are retried after the limit resets; any other failure ends the
//! walk early and the pages fetched so far are returned.

use crate::github::error::FetchError;
use crate::github::rate_limit;
use std::fmt;
use std::future::Future;

/// Number of records requested per page.
pub const PER_PAGE: u32 = 100;

/// One response of a paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Page number to request next, `None` on the last page.
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Page {
            items,
            next_page: None,
        }
    }
}

/// Kind of collection being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Issues,
    Comments { issue_number: u64 },
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Issues => write!(f, "issues"),
            Resource::Comments { issue_number } => {
                write!(f, "comments for issue #{issue_number}")
            }
        }
    }
}

/// Identifies a fetch in diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct FetchScope<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub resource: Resource,
}

/// Records gathered by a page walk.
#[derive(Debug, Clone, PartialEq)]
pub struct Collected<T> {
    pub items: Vec<T>,
    /// Page at which the walk gave up, `None` if every page was fetched.
    pub stopped_at_page: Option<u32>,
}

impl<T> Collected<T> {
    pub fn is_complete(&self) -> bool {
        self.stopped_at_page.is_none()
    }
}

/// Fetches every page of a collection, in order.
///
/// `fetch_page` is called with the page number and page size. The result is
/// always returned as a success: a non rate-limit error logs one warning and
/// yields the records accumulated before the failing page.
pub async fn fetch_all_pages<T, F, Fut>(scope: FetchScope<'_>, mut fetch_page: F) -> Collected<T>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, FetchError>>,
{
    let mut all_items = Vec::new();
    let mut page = 1;

    loop {
        let fetched = match fetch_page(page, PER_PAGE).await {
            Ok(fetched) => fetched,
            Err(err) => {
                if rate_limit::wait_for_rate_limit_reset(&err).await {
                    // try again after rate limit resets.
                    continue;
                }
                tracing::warn!(
                    "unable to get {} of {}:{} (page {}); {}",
                    scope.resource,
                    scope.owner,
                    scope.repo,
                    page,
                    err
                );
                return Collected {
                    items: all_items,
                    stopped_at_page: Some(page),
                };
            }
        };

        all_items.extend(fetched.items);
        match fetched.next_page {
            Some(next) => page = next,
            None => break,
        }
    }

    Collected {
        items: all_items,
        stopped_at_page: None,
    }
}

/// Extracts the `rel="next"` page number from a `Link` response header.
pub fn next_page_from_link(link_header: &str) -> Option<u32> {
    link_header.split(',').find_map(|part| {
        let mut url = None;
        let mut is_next = false;

        for segment in part.split(';') {
            let segment = segment.trim();
            if let Some(inner) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
                url = Some(inner);
            } else if let Some(rel) = segment.strip_prefix("rel=") {
                is_next = rel.trim_matches('"') == "next";
            }
        }

        if is_next { url.and_then(page_from_url) } else { None }
    })
}

fn page_from_url(url: &str) -> Option<u32> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "page")
        .and_then(|(_, value)| value.parse().ok())
}
