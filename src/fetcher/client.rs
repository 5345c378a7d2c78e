//! HTTP fetcher with rate limiting and retry support
//!
//! This module provides the shared HTTP fetcher used by every harvester,
//! with features including:
//! - User-Agent rotation
//! - Rate limiting with governor
//! - Automatic retry with exponential backoff
//! - Login-wall detection

use crate::utils::error::FetchError;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use rand::seq::SliceRandom;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, REFERER, USER_AGENT},
    Client,
};
use std::num::NonZeroU32;
use std::time::Duration;
use url::Url;

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Phrases that indicate a page is behind a login wall
const LOGIN_INDICATORS: &[&str] = &[
    "log in to browse",
    "sign in to view",
    "login required",
    "please log in",
    "authentication required",
    "you need to sign in",
];

/// Shared page fetcher for all harvest sources
///
/// Handles rate limiting, retry logic and header rotation so the
/// harvesters only deal with URLs and HTML.
pub struct PageFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Maximum number of retry attempts for failed requests
    max_retries: u32,

    /// Base delay in milliseconds for exponential backoff
    base_delay_ms: u64,

    /// Optional base URL override for testing with mock servers
    base_url: Option<String>,
}

impl PageFetcher {
    /// Create a new fetcher with default settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(requests_per_second: u32) -> Result<Self, FetchError> {
        Self::with_config(requests_per_second, 3, Duration::from_secs(30))
    }

    /// Create a new fetcher with custom configuration
    ///
    /// # Arguments
    ///
    /// * `requests_per_second` - Maximum number of requests per second
    /// * `max_retries` - Maximum number of retry attempts
    /// * `timeout` - Request timeout duration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(
        requests_per_second: u32,
        max_retries: u32,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::new(1).unwrap());
        let quota = Quota::per_second(rate);
        let rate_limiter = RateLimiter::direct(quota);

        Ok(Self {
            client,
            rate_limiter,
            max_retries,
            base_delay_ms: 1000,
            base_url: None,
        })
    }

    /// Create a new fetcher with a custom base URL for testing
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_base_url(base_url: &str, requests_per_second: u32) -> Result<Self, FetchError> {
        let mut fetcher = Self::new(requests_per_second)?;
        fetcher.base_url = Some(base_url.to_string());
        Ok(fetcher)
    }

    /// Create a fetcher with custom configuration and a base URL override
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config_and_base_url(
        base_url: &str,
        requests_per_second: u32,
        max_retries: u32,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let mut fetcher = Self::with_config(requests_per_second, max_retries, timeout)?;
        fetcher.base_url = Some(base_url.to_string());
        Ok(fetcher)
    }

    /// Fetch a page with retry logic and rate limiting
    ///
    /// This is the main entry point for fetching pages. The optional
    /// referer lets listing pages look like in-site navigation.
    ///
    /// # Errors
    ///
    /// Returns various `FetchError` variants depending on the failure mode,
    /// including `FetchError::InvalidUrl` for unparseable URLs and
    /// `FetchError::LoginRequired` when the body matches a known login-wall
    /// phrase.
    pub async fn fetch_page(&self, url: &str, referer: Option<&str>) -> Result<String, FetchError> {
        // Under a base URL override the argument is a path, not a full URL
        if self.base_url.is_none() {
            Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        }

        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let body = self.fetch_with_retry(url, referer).await?;

        if Self::is_login_walled(&body) {
            return Err(FetchError::LoginRequired);
        }

        Ok(body)
    }

    /// Fetch with exponential backoff retry logic
    ///
    /// # Errors
    ///
    /// Returns `FetchError::MaxRetriesExceeded` if all retries fail
    async fn fetch_with_retry(
        &self,
        url: &str,
        referer: Option<&str>,
    ) -> Result<String, FetchError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            // Apply exponential backoff for retries
            if attempt > 0 {
                let delay = self.base_delay_ms * 2_u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            let headers = self.build_headers(referer);

            let full_url = if let Some(base) = &self.base_url {
                format!("{base}{url}")
            } else {
                url.to_string()
            };

            match self.client.get(&full_url).headers(headers).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response.text().await?);
                    } else if Self::should_retry(status.as_u16()) {
                        last_error = Some(FetchError::ServerError(status.as_u16()));
                        continue;
                    } else {
                        return Err(FetchError::ServerError(status.as_u16()));
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(FetchError::Timeout);
                    } else {
                        last_error = Some(FetchError::Http(e));
                    }
                }
            }
        }

        last_error
            .map(|_| Err(FetchError::MaxRetriesExceeded))
            .unwrap_or(Err(FetchError::MaxRetriesExceeded))
    }

    /// Determine if a status code should trigger a retry
    ///
    /// Retry on 429 and transient 5xx; never on client errors such as
    /// 400/401/403/404.
    fn should_retry(status: u16) -> bool {
        matches!(status, 429 | 500 | 502 | 503 | 504)
    }

    /// Check whether a page body indicates a login wall
    pub fn is_login_walled(body: &str) -> bool {
        let lower = body.to_lowercase();
        LOGIN_INDICATORS.iter().any(|phrase| lower.contains(phrase))
    }

    /// Build HTTP headers for harvest requests
    fn build_headers(&self, referer: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        // Random user agent from pool
        let user_agent = self.random_user_agent();
        headers.insert(USER_AGENT, HeaderValue::from_static(user_agent));

        // Standard browser headers
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(
            ACCEPT_ENCODING,
            HeaderValue::from_static("gzip, deflate, br"),
        );

        if let Some(referer) = referer {
            if let Ok(referer_value) = HeaderValue::from_str(referer) {
                headers.insert(REFERER, referer_value);
            }
        }

        headers
    }

    /// Get a random user agent from the pool
    fn random_user_agent(&self) -> &'static str {
        let mut rng = rand::thread_rng();
        USER_AGENTS.choose(&mut rng).unwrap_or(&USER_AGENTS[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_rotation() {
        let fetcher = PageFetcher::new(10).unwrap();

        let mut agents = std::collections::HashSet::new();
        for _ in 0..100 {
            let agent = fetcher.random_user_agent();
            assert!(USER_AGENTS.contains(&agent));
            agents.insert(agent);
        }

        // With 100 iterations, we should see multiple different agents
        assert!(agents.len() > 1, "User agents should rotate");
    }

    #[test]
    fn test_header_construction() {
        let fetcher = PageFetcher::new(10).unwrap();

        let referer = "https://devpost.com/hackathons";
        let headers = fetcher.build_headers(Some(referer));

        assert!(headers.contains_key(REFERER));
        assert_eq!(headers.get(REFERER).unwrap().to_str().unwrap(), referer);
        assert!(headers.contains_key(USER_AGENT));
        assert!(headers.contains_key(ACCEPT));
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
        assert!(headers.contains_key(ACCEPT_ENCODING));

        let headers = fetcher.build_headers(None);
        assert!(!headers.contains_key(REFERER));
    }

    #[test]
    fn test_should_retry() {
        // Retryable errors
        assert!(PageFetcher::should_retry(429));
        assert!(PageFetcher::should_retry(500));
        assert!(PageFetcher::should_retry(502));
        assert!(PageFetcher::should_retry(503));
        assert!(PageFetcher::should_retry(504));

        // Non-retryable errors
        assert!(!PageFetcher::should_retry(400));
        assert!(!PageFetcher::should_retry(401));
        assert!(!PageFetcher::should_retry(403));
        assert!(!PageFetcher::should_retry(404));
        assert!(!PageFetcher::should_retry(200));
    }

    #[test]
    fn test_login_wall_detection() {
        assert!(PageFetcher::is_login_walled(
            "<p>Please Log In to Browse the participant list</p>"
        ));
        assert!(PageFetcher::is_login_walled(
            "You need to sign in before continuing"
        ));
        assert!(!PageFetcher::is_login_walled(
            "<div class=\"user-profile\">Alice</div>"
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_rejected_before_any_request() {
        let fetcher = PageFetcher::new(10).unwrap();

        match fetcher.fetch_page("not a url", None).await {
            Err(FetchError::InvalidUrl(url)) => assert_eq!(url, "not a url"),
            other => panic!("expected InvalidUrl, got {other:?}"),
        }
    }

    #[test]
    fn test_fetcher_creation() {
        assert!(PageFetcher::new(10).is_ok());
        assert!(PageFetcher::with_config(5, 3, Duration::from_secs(10)).is_ok());

        let fetcher = PageFetcher::with_base_url("http://localhost:8080", 10).unwrap();
        assert_eq!(fetcher.base_url, Some("http://localhost:8080".to_string()));
    }
}
