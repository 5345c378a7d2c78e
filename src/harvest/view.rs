//! List view abstraction for the scroll harvester
//!
//! The harvester only needs three things from a view: how many items are
//! currently materialized, a way to trigger more content, and the current
//! document for the parse step. The production implementation is an
//! HTTP-paged view; tests use scripted in-memory views.

use async_trait::async_trait;

use crate::fetcher::PageFetcher;
use crate::utils::error::HarvestError;

/// A live, mutable list view that renders items incrementally
#[async_trait]
pub trait ListView: Send {
    /// Number of items currently materialized in the view
    async fn item_count(&mut self) -> Result<usize, HarvestError>;

    /// Trigger the view to load more content
    async fn load_more(&mut self) -> Result<(), HarvestError>;

    /// Monotonic growth signal independent of the item count
    ///
    /// The page-height analog: it can grow while the item count stalls
    /// (markup arriving that the item selector does not match).
    fn growth_marker(&self) -> u64;

    /// Current materialized document, for the separate parse step
    fn page_source(&self) -> &str;
}

/// Counts items of interest in a document
pub type ItemCounter = Box<dyn Fn(&str) -> usize + Send + Sync>;

/// HTTP-backed paged list view
///
/// Each `load_more` fetches the next `?page=N` of the listing and appends
/// the body to the accumulated document, so previously observed items are
/// never lost.
pub struct HttpListView<'a> {
    fetcher: &'a PageFetcher,
    url: String,
    referer: Option<String>,
    counter: ItemCounter,
    next_page: u32,
    source: String,
}

impl<'a> HttpListView<'a> {
    pub fn new(fetcher: &'a PageFetcher, url: &str, counter: ItemCounter) -> Self {
        Self {
            fetcher,
            url: url.to_string(),
            referer: None,
            counter,
            next_page: 1,
            source: String::new(),
        }
    }

    /// Set a referer header for in-site navigation
    #[must_use]
    pub fn with_referer(mut self, referer: &str) -> Self {
        self.referer = Some(referer.to_string());
        self
    }

    /// Build the URL for a given page number
    fn page_url(&self, page: u32) -> String {
        if page <= 1 {
            return self.url.clone();
        }
        if self.url.contains('?') {
            format!("{}&page={page}", self.url)
        } else {
            format!("{}?page={page}", self.url)
        }
    }

    /// Number of pages fetched so far
    pub fn pages_fetched(&self) -> u32 {
        self.next_page.saturating_sub(1)
    }
}

#[async_trait]
impl ListView for HttpListView<'_> {
    async fn item_count(&mut self) -> Result<usize, HarvestError> {
        Ok((self.counter)(&self.source))
    }

    async fn load_more(&mut self) -> Result<(), HarvestError> {
        let url = self.page_url(self.next_page);
        let body = self
            .fetcher
            .fetch_page(&url, self.referer.as_deref())
            .await?;

        self.source.push_str(&body);
        self.next_page += 1;
        Ok(())
    }

    fn growth_marker(&self) -> u64 {
        self.source.len() as u64
    }

    fn page_source(&self) -> &str {
        &self.source
    }
}
