//! Reader pipeline tests against a local HTTP server
use broadsheet_core::*;
use httpmock::prelude::*;

const PRIMARY_UA: &str = "broadsheet-test/primary";
const FALLBACK_UA: &str = "broadsheet-test/fallback";

const EMPTY_PAGE: &str = "<html><head><title>Blocked</title></head><body><script>challenge()</script></body></html>";

const STORY_PAGE: &str = r#"<html><head><meta property="og:title" content="Story"></head>
<body><article><p>First paragraph of the story.</p><p>Second paragraph of the story.</p></article></body></html>"#;

fn reader() -> Reader {
    Reader::with_config(ReaderConfig::builder().user_agent(PRIMARY_UA).fallback_user_agent(FALLBACK_UA).timeout(5).build())
}

#[tokio::test]
async fn test_read_first_attempt_succeeds() {
    let server = MockServer::start_async().await;
    let primary = server
        .mock_async(|when, then| {
            when.method(GET).path("/story").header("user-agent", PRIMARY_UA);
            then.status(200).header("content-type", "text/html").body(STORY_PAGE);
        })
        .await;
    let fallback = server
        .mock_async(|when, then| {
            when.method(GET).path("/story").header("user-agent", FALLBACK_UA);
            then.status(200).body(STORY_PAGE);
        })
        .await;

    let result = reader().read(&server.url("/story")).await.unwrap();

    primary.assert_async().await;
    fallback.assert_calls_async(0).await;
    assert_eq!(result.title.as_deref(), Some("Story"));
    assert_eq!(result.paragraphs, vec!["First paragraph of the story.", "Second paragraph of the story."]);
    assert_eq!(result.url, Some(server.url("/story")));
}

#[tokio::test]
async fn test_read_retries_once_with_fallback_user_agent() {
    let server = MockServer::start_async().await;
    let primary = server
        .mock_async(|when, then| {
            when.method(GET).path("/story").header("user-agent", PRIMARY_UA);
            then.status(200).body(EMPTY_PAGE);
        })
        .await;
    let fallback = server
        .mock_async(|when, then| {
            when.method(GET).path("/story").header("user-agent", FALLBACK_UA);
            then.status(200).body(STORY_PAGE);
        })
        .await;

    let result = reader().read(&server.url("/story")).await.unwrap();

    primary.assert_async().await;
    fallback.assert_async().await;
    assert_eq!(result.paragraphs.len(), 2);
    assert_eq!(result.title.as_deref(), Some("Blocked"));
}

#[tokio::test]
async fn test_read_gives_up_after_one_retry() {
    let server = MockServer::start_async().await;
    let empty = server
        .mock_async(|when, then| {
            when.method(GET).path("/story");
            then.status(200).body(EMPTY_PAGE);
        })
        .await;

    let result = reader().read(&server.url("/story")).await.unwrap();

    empty.assert_calls_async(2).await;
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_read_fallback_failure_yields_empty_result() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/story").header("user-agent", PRIMARY_UA);
            then.status(200).body(EMPTY_PAGE);
        })
        .await;
    let fallback = server
        .mock_async(|when, then| {
            when.method(GET).path("/story").header("user-agent", FALLBACK_UA);
            then.status(500);
        })
        .await;

    let result = reader().read(&server.url("/story")).await.unwrap();

    fallback.assert_async().await;
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_read_first_fetch_failure_is_an_error() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/story");
            then.status(503);
        })
        .await;

    let result = reader().read(&server.url("/story")).await;

    mock.assert_calls_async(1).await;
    assert!(matches!(result, Err(BroadsheetError::HttpStatus { status: 503, .. })));
}

#[tokio::test]
async fn test_read_respects_allowlist_before_fetching() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/story");
            then.status(200).body(STORY_PAGE);
        })
        .await;

    let config = ReaderConfig::builder().allow_domains(["news.example.com"]).build();
    let result = Reader::with_config(config).read(&server.url("/story")).await;

    mock.assert_calls_async(0).await;
    assert!(matches!(result, Err(BroadsheetError::DomainNotAllowed(_))));
}

#[tokio::test]
async fn test_read_rejects_unsupported_scheme() {
    let result = reader().read("file:///etc/passwd").await;
    assert!(matches!(result, Err(BroadsheetError::UnsupportedScheme(_))));
}

#[tokio::test]
async fn test_read_follows_redirect_within_allowlist() {
    let server = MockServer::start_async().await;
    let moved = server
        .mock_async(|when, then| {
            when.method(GET).path("/old");
            then.status(301).header("location", "/story");
        })
        .await;
    let story = server
        .mock_async(|when, then| {
            when.method(GET).path("/story");
            then.status(200).body(STORY_PAGE);
        })
        .await;

    let config = ReaderConfig::builder().allow_domains(["127.0.0.1"]).build();
    let result = Reader::with_config(config).read(&server.url("/old")).await.unwrap();

    moved.assert_async().await;
    story.assert_async().await;
    assert_eq!(result.paragraphs.len(), 2);
}

#[tokio::test]
async fn test_read_blocks_redirect_to_disallowed_host() {
    let allowed = MockServer::start_async().await;
    let internal = MockServer::start_async().await;

    let secret = internal
        .mock_async(|when, then| {
            when.method(GET).path("/secret");
            then.status(200).body("<p>Internal secret page.</p>");
        })
        .await;
    let target = format!("http://localhost:{}/secret", internal.port());
    let bounce = allowed
        .mock_async(|when, then| {
            when.method(GET).path("/story");
            then.status(302).header("location", target.as_str());
        })
        .await;

    let config = ReaderConfig::builder().allow_domains(["127.0.0.1"]).build();
    let result = Reader::with_config(config).read(&allowed.url("/story")).await;

    bounce.assert_calls_async(1).await;
    secret.assert_calls_async(0).await;
    assert!(matches!(result, Err(BroadsheetError::DomainNotAllowed(host)) if host == "localhost"));
}

#[tokio::test]
async fn test_read_rejects_redirect_to_other_scheme() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/story");
            then.status(302).header("location", "file:///etc/passwd");
        })
        .await;

    let result = reader().read(&server.url("/story")).await;
    assert!(matches!(result, Err(BroadsheetError::UnsupportedScheme(s)) if s == "file"));
}

#[tokio::test]
async fn test_read_stops_redirect_loops() {
    let server = MockServer::start_async().await;
    let looping = server
        .mock_async(|when, then| {
            when.method(GET).path("/loop");
            then.status(302).header("location", "/loop");
        })
        .await;

    let result = reader().read(&server.url("/loop")).await;

    looping.assert_calls_async(11).await;
    assert!(matches!(result, Err(BroadsheetError::TooManyRedirects { limit: 10, .. })));
}
