//! Integration tests for PageFetcher using wiremock
//!
//! These tests validate the HTTP fetcher's behavior with mock servers.

use gleaner::fetcher::PageFetcher;
use gleaner::utils::error::FetchError;
use std::time::Duration;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test successful fetch from mock server
#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;
    let html = r#"<!DOCTYPE html>
<html>
<body><div class="user-profile"><a class="user-profile-link" href="/alice">Alice</a></div></body>
</html>"#;

    Mock::given(method("GET"))
        .and(path("/participants"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&mock_server)
        .await;

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 10).unwrap();
    let result = fetcher.fetch_page("/participants", None).await;

    assert!(result.is_ok(), "Fetch should succeed: {:?}", result.err());
    assert!(result.unwrap().contains("user-profile"));
}

/// Test that server errors trigger retries
#[tokio::test]
async fn test_server_error_retry() {
    let mock_server = MockServer::start().await;

    // Return 500 twice, then succeed
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&mock_server)
        .await;

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 100).unwrap();
    let result = fetcher.fetch_page("/flaky", None).await;

    assert!(result.is_ok(), "Should succeed after retries");
}

/// Test 404 does not retry
#[tokio::test]
async fn test_404_no_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/notfound"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1) // Should only be called once (no retry)
        .mount(&mock_server)
        .await;

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 100).unwrap();
    let result = fetcher.fetch_page("/notfound", None).await;

    assert!(matches!(result, Err(FetchError::ServerError(404))));
}

/// Test max retries exceeded
#[tokio::test]
async fn test_max_retries_exceeded() {
    let mock_server = MockServer::start().await;

    // Always return 503
    Mock::given(method("GET"))
        .and(path("/always-fail"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let fetcher = PageFetcher::with_config_and_base_url(
        &mock_server.uri(),
        100,
        2, // max_retries
        Duration::from_secs(30),
    )
    .unwrap();

    let result = fetcher.fetch_page("/always-fail", None).await;
    assert!(matches!(result, Err(FetchError::MaxRetriesExceeded)));
}

/// Test login wall detection turns a 200 into an error
#[tokio::test]
async fn test_login_wall_detection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/walled"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<p>Please log in to browse the participant list</p>"),
        )
        .mount(&mock_server)
        .await;

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 10).unwrap();
    let result = fetcher.fetch_page("/walled", None).await;

    assert!(matches!(result, Err(FetchError::LoginRequired)));
}

/// Test User-Agent header is set
#[tokio::test]
async fn test_user_agent_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ua-test"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&mock_server)
        .await;

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 10).unwrap();
    let result = fetcher.fetch_page("/ua-test", None).await;

    assert!(result.is_ok());
}

/// Test Referer header is forwarded
#[tokio::test]
async fn test_referer_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ref-test"))
        .and(wiremock::matchers::header(
            "referer",
            "https://devpost.com/hackathons",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 10).unwrap();
    let result = fetcher
        .fetch_page("/ref-test", Some("https://devpost.com/hackathons"))
        .await;

    assert!(result.is_ok());
}
