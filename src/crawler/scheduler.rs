//! Fetch scheduling: concurrency limiting and retries
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore (optional)
//! - Retrying transient fetch failures with a fixed delay

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchError, Fetcher};
use std::time::Duration;
use tokio::sync::Semaphore;

/// How transient fetch failures are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one
    pub max_retries: u32,

    /// Pause before each retry
    pub delay: Duration,
}

impl RetryPolicy {
    /// Returns true if a failure on attempt number `attempt` (0-based) should be retried
    pub fn should_retry(&self, error: &FetchError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_transient()
    }
}

/// Scheduler gates fetches behind the concurrency limit and applies retries
///
/// Crawl tasks are spawned eagerly, one per claimed URL; the scheduler is
/// where they wait for a fetch slot.
#[derive(Debug)]
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches; `None` is unbounded
    permits: Option<Semaphore>,

    /// Configured limit, for reporting
    limit: Option<usize>,

    retry: RetryPolicy,
}

impl Scheduler {
    /// Creates a scheduler from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Self {
        let limit = match config.max_concurrent_fetches {
            0 => None,
            n => Some(n),
        };

        Self {
            permits: limit.map(Semaphore::new),
            limit,
            retry: RetryPolicy {
                max_retries: config.fetch_retries,
                delay: Duration::from_millis(config.retry_delay_ms),
            },
        }
    }

    /// The configured concurrency limit, `None` if unbounded
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Free fetch slots, `None` if unbounded
    pub fn available_permits(&self) -> Option<usize> {
        self.permits.as_ref().map(Semaphore::available_permits)
    }

    /// The retry policy in effect
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Fetches `url` once a slot is free, retrying transient failures
    ///
    /// The slot is held for the whole sequence of attempts, including the
    /// pauses between them.
    pub async fn fetch<F: Fetcher>(&self, fetcher: &F, url: &str) -> Result<String, FetchError> {
        // The semaphore is never closed, so acquire only fails if it is
        let _permit = match &self.permits {
            Some(semaphore) => semaphore.acquire().await.ok(),
            None => None,
        };

        let mut attempt = 0;
        loop {
            match fetcher.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(error) if self.retry.should_retry(&error, attempt) => {
                    attempt += 1;
                    tracing::debug!(
                        "Retrying {} after {} (attempt {}/{})",
                        url,
                        error,
                        attempt,
                        self.retry.max_retries
                    );
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
