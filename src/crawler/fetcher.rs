//! Page fetching
//!
//! This module defines the [`Fetcher`] capability the orchestrator consumes and
//! the HTTP implementation used by the binary:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - Error classification (status, timeout, connection, content type)

use crate::config::{FetchConfig, UserAgentConfig};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Why a page could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Expected HTML, got {content_type}")]
    ContentMismatch { content_type: String },

    #[error("Failed to read body: {0}")]
    Body(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl FetchError {
    /// Returns true if retrying the same request might succeed
    ///
    /// | Condition | Transient |
    /// |-----------|-----------|
    /// | HTTP 429 | yes |
    /// | HTTP 5xx | yes |
    /// | Timeout | yes |
    /// | Connection failure | yes |
    /// | Other HTTP status | no |
    /// | Content-Type mismatch | no |
    /// | Body / request errors | no |
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status } => *status == 429 || *status >= 500,
            Self::Timeout | Self::Connect(_) => true,
            Self::ContentMismatch { .. } | Self::Body(_) | Self::Request(_) => false,
        }
    }
}

/// Retrieves the raw content of a page
///
/// Implementations must be shareable across tasks; the orchestrator calls
/// `fetch` concurrently from many tasks.
pub trait Fetcher: Send + Sync + 'static {
    /// Fetches `url` and returns its body as text
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// Redirects follow reqwest's default policy (up to 10 hops).
///
/// # Example
///
/// ```no_run
/// use plainsight::config::{FetchConfig, UserAgentConfig};
/// use plainsight::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetch: &FetchConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a freshly built client
    pub fn new(user_agent: &UserAgentConfig, fetch: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(user_agent, fetch)?))
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        // A missing Content-Type is treated as HTML
        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_html(content_type) {
                return Err(FetchError::ContentMismatch {
                    content_type: content_type.to_string(),
                });
            }
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
}

fn classify_request_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else {
        FetchError::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&UserAgentConfig::default(), &FetchConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_http_fetcher_new() {
        let fetcher = HttpFetcher::new(&UserAgentConfig::default(), &FetchConfig::default());
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("text/html"));
        assert!(is_html("text/html; charset=utf-8"));
        assert!(is_html("Text/HTML"));
        assert!(is_html("application/xhtml+xml"));
        assert!(!is_html("image/png"));
        assert!(!is_html("application/json"));
    }

    #[test]
    fn test_transient_errors() {
        assert!(FetchError::Status { status: 503 }.is_transient());
        assert!(FetchError::Status { status: 429 }.is_transient());
        assert!(FetchError::Timeout.is_transient());
        assert!(FetchError::Connect("refused".to_string()).is_transient());
    }

    #[test]
    fn test_permanent_errors() {
        assert!(!FetchError::Status { status: 404 }.is_transient());
        assert!(!FetchError::ContentMismatch {
            content_type: "image/png".to_string()
        }
        .is_transient());
        assert!(!FetchError::Request("builder error".to_string()).is_transient());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(FetchError::Status { status: 404 }.to_string(), "HTTP 404");
        assert_eq!(FetchError::Timeout.to_string(), "Request timeout");
    }

    // Responses from a live server are covered with wiremock in the
    // integration tests
}
