//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the HTTP fetcher and the full crawl cycle end-to-end.

use plainsight::config::{Config, CrawlerConfig, FetchConfig, TerminationPolicy, UserAgentConfig};
use plainsight::crawler::{run_crawl, FetchError, Fetcher, HttpFetcher};
use plainsight::output::{ConsoleReporter, FinishReason, MemoryReporter};
use std::collections::BTreeSet;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts
fn create_test_config(termination: TerminationPolicy) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrent_fetches: 4,
            termination,
            idle_window_ms: 200,
            fetch_retries: 0,
            retry_delay_ms: 10,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: None,
        },
        fetch: FetchConfig {
            timeout_secs: 5,
            connect_timeout_secs: 2,
        },
    }
}

fn test_fetcher() -> HttpFetcher {
    let config = create_test_config(TerminationPolicy::InFlight);
    HttpFetcher::new(&config.user_agent, &config.fetch).expect("Failed to build fetcher")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_bytes(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

/// Mounts a small site:
/// `/` links `/b` and `/missing` and embeds an insecure image,
/// `/b` embeds an insecure object and links back home and off-site.
async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r##"<a href="/b">B</a>
               <a href="/missing">Missing</a>
               <a href="#top">Top</a>
               <img src="http://insecure.com/i.png">
               <img src="https://secure.com/ok.png">"##,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html(
            r#"<object data="http://insecure.com/o.swf"></object>
               <a href="/">Home</a>
               <a href="https://other.com/x">Elsewhere</a>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_http_fetcher_returns_html() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", "TestBot/1.0.0"))
        .respond_with(html("<p>hello</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = test_fetcher()
        .fetch(&format!("{}/page", mock_server.uri()))
        .await
        .expect("Fetch failed");

    assert!(body.contains("<p>hello</p>"));
}

#[tokio::test]
async fn test_http_fetcher_missing_content_type_is_html() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bare"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>bare</p>"))
        .mount(&mock_server)
        .await;

    let body = test_fetcher()
        .fetch(&format!("{}/bare", mock_server.uri()))
        .await
        .expect("Fetch failed");

    assert_eq!(body, "<p>bare</p>");
}

#[tokio::test]
async fn test_http_fetcher_maps_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher();

    let gone = fetcher
        .fetch(&format!("{}/gone", mock_server.uri()))
        .await
        .unwrap_err();
    assert_eq!(gone, FetchError::Status { status: 404 });
    assert!(!gone.is_transient());

    let broken = fetcher
        .fetch(&format!("{}/broken", mock_server.uri()))
        .await
        .unwrap_err();
    assert_eq!(broken, FetchError::Status { status: 500 });
    assert!(broken.is_transient());
}

#[tokio::test]
async fn test_http_fetcher_rejects_non_html() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/image.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x89, 0x50, 0x4e, 0x47])
                .insert_header("content-type", "image/png"),
        )
        .mount(&mock_server)
        .await;

    let err = test_fetcher()
        .fetch(&format!("{}/image.png", mock_server.uri()))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        FetchError::ContentMismatch {
            content_type: "image/png".to_string()
        }
    );
}

#[tokio::test]
async fn test_http_fetcher_connection_refused() {
    // Nothing listens on port 1
    let err = test_fetcher()
        .fetch("http://127.0.0.1:1/")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Connect(_) | FetchError::Request(_)));
}

#[tokio::test]
async fn test_full_crawl_reports_insecure_resources() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let config = create_test_config(TerminationPolicy::InFlight);
    let mut reporter = MemoryReporter::new();

    let summary = run_crawl(&config, &format!("{}/", base_url), &mut reporter)
        .await
        .expect("Crawl failed");

    // Pages
    let expected_pages: BTreeSet<String> = [
        base_url.clone(),
        format!("{}/b", base_url),
        format!("{}/missing", base_url),
    ]
    .into_iter()
    .collect();
    assert_eq!(summary.seed, base_url);
    assert_eq!(summary.pages, expected_pages);
    assert_eq!(summary.reason, FinishReason::Exhausted);

    // Findings
    let findings: BTreeSet<String> = reporter.findings.iter().map(|f| f.to_string()).collect();
    let expected_findings: BTreeSet<String> = [
        format!("{}: http://insecure.com/i.png", base_url),
        format!("{}/b: http://insecure.com/o.swf", base_url),
    ]
    .into_iter()
    .collect();
    assert_eq!(findings, expected_findings);

    // Failures
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(
        summary.failures.get(&format!("{}/missing", base_url)),
        Some(&FetchError::Status { status: 404 })
    );
    assert_eq!(reporter.failures.len(), 1);
}

#[tokio::test]
async fn test_full_crawl_fetches_each_page_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Every page links to every other page
    let links = r#"<a href="/">home</a><a href="/a">a</a><a href="/b">b</a>"#;
    for p in ["/", "/a", "/b"] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(html(links))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(TerminationPolicy::InFlight);
    let mut reporter = MemoryReporter::new();
    let summary = run_crawl(&config, &base_url, &mut reporter)
        .await
        .expect("Crawl failed");

    assert_eq!(summary.pages.len(), 3);
    assert!(reporter.findings.is_empty());

    // Dropping the server verifies the `expect(1)` counts
    drop(mock_server);
}

#[tokio::test]
async fn test_full_crawl_idle_window_policy() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let config = create_test_config(TerminationPolicy::IdleWindow);
    let mut reporter = MemoryReporter::new();

    let summary = run_crawl(&config, &base_url, &mut reporter)
        .await
        .expect("Crawl failed");

    assert_eq!(summary.reason, FinishReason::IdleWindow);
    assert_eq!(summary.pages.len(), 3);
    assert_eq!(reporter.findings.len(), 2);
}

#[tokio::test]
async fn test_full_crawl_console_output() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let config = create_test_config(TerminationPolicy::InFlight);
    let mut reporter = ConsoleReporter::new(Vec::new());

    run_crawl(&config, &base_url, &mut reporter)
        .await
        .expect("Crawl failed");

    let output = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(output.starts_with("-----\nInsecure resources (page: resource):\n-----\n"));
    assert!(output.contains(&format!("{}: http://insecure.com/i.png\n", base_url)));
    assert!(output.contains(&format!("{}/b: http://insecure.com/o.swf\n", base_url)));
    assert!(output.contains("Analyzed pages:"));
    assert!(output.contains(&format!("{}/missing\n", base_url)));
}

#[tokio::test]
async fn test_full_crawl_retries_transient_failures() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // First request fails, later ones succeed
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<iframe src="http://ads.example.net/frame"></iframe>"#))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(TerminationPolicy::InFlight);
    config.crawler.fetch_retries = 2;
    let mut reporter = MemoryReporter::new();

    let summary = run_crawl(&config, &base_url, &mut reporter)
        .await
        .expect("Crawl failed");

    assert!(summary.failures.is_empty());
    assert_eq!(reporter.findings.len(), 1);
    assert_eq!(reporter.findings[0].resource, "http://ads.example.net/frame");
}
