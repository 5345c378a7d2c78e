//! Numbered-page walker
//!
//! The simpler of the two loop shapes: fetch `?page=N` for N = 1, 2, 3...
//! until the listing runs dry. Exhaustion is detected two ways, whichever
//! comes first: a run of consecutive pages yielding no items, or the page
//! no longer advertising a `rel="next"` link. A failed fetch counts as an
//! empty page after a longer wait, so persistent errors drain the same
//! cap instead of looping forever.

use rand::Rng;
use std::time::Duration;

use crate::fetcher::PageFetcher;
use crate::utils::error::HarvestError;

/// Tuning knobs for a page walk
#[derive(Debug, Clone)]
pub struct WalkPolicy {
    /// Absolute page ceiling
    pub max_pages: u32,

    /// Consecutive item-less pages (including failed fetches) before the
    /// listing counts as exhausted
    pub empty_page_cap: u32,

    /// Randomized wait between pages (milliseconds)
    pub min_wait_ms: u64,
    pub max_wait_ms: u64,

    /// Wait after a page-level error (milliseconds)
    pub error_wait_ms: u64,
}

impl Default for WalkPolicy {
    fn default() -> Self {
        Self {
            max_pages: 200,
            empty_page_cap: 3,
            min_wait_ms: 1000,
            max_wait_ms: 3000,
            error_wait_ms: 5000,
        }
    }
}

impl WalkPolicy {
    /// Zero waits, for tests against mock servers
    #[doc(hidden)]
    pub fn without_waits(mut self) -> Self {
        self.min_wait_ms = 0;
        self.max_wait_ms = 0;
        self.error_wait_ms = 0;
        self
    }
}

/// What a page walk produced
#[derive(Debug)]
pub struct WalkOutcome<T> {
    pub items: Vec<T>,
    pub pages_walked: u32,
}

/// Walks numbered listing pages until they stop yielding items
pub struct PageWalker<'a> {
    fetcher: &'a PageFetcher,
    policy: WalkPolicy,
}

impl<'a> PageWalker<'a> {
    pub fn new(fetcher: &'a PageFetcher, policy: WalkPolicy) -> Self {
        Self { fetcher, policy }
    }

    /// Walk the listing at `url`, collecting items from every page
    ///
    /// `parse` extracts the items of one page body. A failed fetch is
    /// treated as an empty page after a longer wait; only a walk that
    /// never yields a single page is an error.
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::NoRecords` if no page could be fetched at all.
    pub async fn walk<T, P>(&self, url: &str, parse: P) -> Result<WalkOutcome<T>, HarvestError>
    where
        P: Fn(&str) -> Vec<T>,
    {
        let mut items = Vec::new();
        let mut pages_walked: u32 = 0;
        let mut empty_streak: u32 = 0;

        tracing::info!(url, max_pages = self.policy.max_pages, "Starting page walk");

        for page in 1..=self.policy.max_pages {
            let page_url = Self::page_url(url, page);

            let body = match self.fetcher.fetch_page(&page_url, Some(url)).await {
                Ok(body) => body,
                Err(e) => {
                    empty_streak += 1;
                    tracing::warn!(page, error = %e, empty_streak, "Page fetch failed");
                    if empty_streak >= self.policy.empty_page_cap {
                        tracing::warn!(page, "Too many consecutive dry pages, stopping");
                        break;
                    }
                    self.sleep_ms(self.policy.error_wait_ms).await;
                    continue;
                }
            };

            pages_walked += 1;
            let page_items = parse(&body);

            if page_items.is_empty() {
                empty_streak += 1;
                tracing::debug!(page, empty_streak, "Page yielded no items");
                if empty_streak >= self.policy.empty_page_cap {
                    tracing::info!(page, "Listing exhausted, stopping");
                    break;
                }
            } else {
                empty_streak = 0;
                tracing::debug!(page, count = page_items.len(), "Page yielded items");
                items.extend(page_items);
            }

            if !Self::has_next_page(&body) {
                tracing::info!(page, "No next-page link, stopping");
                break;
            }

            self.page_wait().await;
        }

        if pages_walked == 0 {
            return Err(HarvestError::NoRecords);
        }

        tracing::info!(
            pages_walked,
            items = items.len(),
            "Page walk finished"
        );

        Ok(WalkOutcome { items, pages_walked })
    }

    /// Build the URL for a given page number
    fn page_url(url: &str, page: u32) -> String {
        if page <= 1 {
            return url.to_string();
        }
        if url.contains('?') {
            format!("{url}&page={page}")
        } else {
            format!("{url}?page={page}")
        }
    }

    /// Check for a `rel="next"` pagination link in the page body
    fn has_next_page(body: &str) -> bool {
        body.contains(r#"rel="next""#) || body.contains("rel='next'")
    }

    async fn page_wait(&self) {
        let (min, max) = (self.policy.min_wait_ms, self.policy.max_wait_ms);
        let wait = if max > min {
            rand::thread_rng().gen_range(min..=max)
        } else {
            min
        };
        self.sleep_ms(wait).await;
    }

    async fn sleep_ms(&self, ms: u64) {
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url_building() {
        assert_eq!(
            PageWalker::page_url("https://github.com/o/r/stargazers", 1),
            "https://github.com/o/r/stargazers"
        );
        assert_eq!(
            PageWalker::page_url("https://github.com/o/r/stargazers", 2),
            "https://github.com/o/r/stargazers?page=2"
        );
        assert_eq!(
            PageWalker::page_url("https://example.org/list?tab=all", 4),
            "https://example.org/list?tab=all&page=4"
        );
    }

    #[test]
    fn test_next_page_detection() {
        assert!(PageWalker::has_next_page(
            r#"<a rel="next" href="/stargazers?page=2">Next</a>"#
        ));
        assert!(PageWalker::has_next_page("<a rel='next' href='?page=2'>"));
        assert!(!PageWalker::has_next_page(
            r#"<a rel="prev" href="/stargazers?page=1">Previous</a>"#
        ));
    }
}
