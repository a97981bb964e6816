//! Exactly-once URL claiming
//!
//! The registry is the crawl's only deduplication mechanism. A URL is crawled
//! by whoever claims it first; every later claim of the same string fails.

use dashmap::DashSet;
use std::collections::BTreeSet;

/// Thread-safe set of URLs already claimed for processing
///
/// Entries are only ever added, never removed. The registry lives for a single
/// crawl run.
#[derive(Debug, Default)]
pub struct Registry {
    claimed: DashSet<String>,
}

impl Registry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims `url`
    ///
    /// Returns `true` for the first caller to claim this exact URL and `false`
    /// for every later call, regardless of how concurrent callers interleave.
    ///
    /// # Example
    ///
    /// ```
    /// use plainsight::crawler::Registry;
    ///
    /// let registry = Registry::new();
    /// assert!(registry.claim("https://example.com"));
    /// assert!(!registry.claim("https://example.com"));
    /// ```
    pub fn claim(&self, url: &str) -> bool {
        // Check-and-insert under the shard's write lock
        self.claimed.insert(url.to_string())
    }

    /// Returns true if `url` has been claimed
    pub fn is_claimed(&self, url: &str) -> bool {
        self.claimed.contains(url)
    }

    /// Number of claimed URLs
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Returns true if nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }

    /// Returns every claimed URL, sorted
    ///
    /// Only a consistent view once no one is claiming anymore, i.e. after the
    /// crawl has terminated.
    pub fn snapshot(&self) -> BTreeSet<String> {
        self.claimed.iter().map(|url| url.key().clone()).collect()
    }
}
