//! Reporter trait and report types
//!
//! This module defines the interface the orchestrator reports through and the
//! data structures it reports: findings as they happen, and a summary once
//! the crawl is done.

use crate::crawler::FetchError;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A page that embeds a resource over an insecure transport
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Finding {
    /// The page the resource is embedded in
    pub page: String,

    /// The insecure resource URL
    pub resource: String,
}

impl Finding {
    pub fn new(page: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            resource: resource.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.page, self.resource)
    }
}

/// Why the orchestrator stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinishReason {
    /// Every crawl task completed and no discovered link was left
    Exhausted,

    /// A full idle window passed without a newly discovered link
    IdleWindow,

    /// The operator interrupted the crawl
    Interrupted,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::IdleWindow => "idle window elapsed",
            Self::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    // Run metadata
    pub seed: String,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub reason: FinishReason,

    /// Every claimed URL (pages analyzed)
    pub pages: BTreeSet<String>,

    /// Every finding, in the order it was reported
    pub findings: Vec<Finding>,

    /// Claimed pages whose fetch failed, with the cause
    pub failures: BTreeMap<String, FetchError>,
}

impl CrawlSummary {
    /// Number of claimed pages whose fetch succeeded or is unknown
    ///
    /// Under the idle-window policy or after an interruption, some claimed
    /// pages may never have been fetched at all.
    pub fn pages_without_failure(&self) -> usize {
        self.pages.len().saturating_sub(self.failures.len())
    }

    /// Findings grouped by page, both levels sorted
    pub fn findings_by_page(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut grouped: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for finding in &self.findings {
            grouped
                .entry(finding.page.as_str())
                .or_default()
                .insert(finding.resource.as_str());
        }
        grouped
    }

    /// Distinct insecure resource URLs across the whole site
    pub fn distinct_resources(&self) -> BTreeSet<&str> {
        self.findings.iter().map(|f| f.resource.as_str()).collect()
    }
}

/// Trait for reporters
///
/// The orchestrator calls the reporter from its own loop, never from crawl
/// tasks, so implementations need not be thread-safe.
pub trait Reporter {
    /// Called once before the seed is fetched
    fn begin(&mut self, _seed: &str) -> OutputResult<()> {
        Ok(())
    }

    /// Records a finding as soon as it is discovered
    fn finding(&mut self, finding: &Finding) -> OutputResult<()>;

    /// Records a page that could not be fetched
    fn fetch_failed(&mut self, _url: &str, _error: &FetchError) -> OutputResult<()> {
        Ok(())
    }

    /// Reports the final summary
    fn finish(&mut self, summary: &CrawlSummary) -> OutputResult<()>;
}

#[cfg(test)]
pub(crate) fn sample_summary() -> CrawlSummary {
    CrawlSummary {
        seed: "https://example.com".to_string(),
        started_at: Utc::now(),
        duration: Duration::from_millis(1500),
        reason: FinishReason::Exhausted,
        pages: [
            "https://example.com",
            "https://example.com/b",
            "https://example.com/gone",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        findings: vec![
            Finding::new("https://example.com/b", "http://insecure.com/o.swf"),
            Finding::new("https://example.com", "http://insecure.com/i.png"),
            Finding::new("https://example.com", "http://cdn.com/x.png"),
        ],
        failures: [(
            "https://example.com/gone".to_string(),
            FetchError::Status { status: 404 },
        )]
        .into_iter()
        .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finding_display() {
        let finding = Finding::new("https://example.com", "http://insecure.com/i.png");
        assert_eq!(
            finding.to_string(),
            "https://example.com: http://insecure.com/i.png"
        );
    }

    #[test]
    fn test_pages_without_failure() {
        let summary = sample_summary();
        assert_eq!(summary.pages_without_failure(), 2);
    }

    #[test]
    fn test_findings_by_page() {
        let summary = sample_summary();
        let grouped = summary.findings_by_page();

        assert_eq!(grouped.len(), 2);
        let home: Vec<_> = grouped["https://example.com"].iter().copied().collect();
        assert_eq!(
            home,
            vec!["http://cdn.com/x.png", "http://insecure.com/i.png"]
        );
    }

    #[test]
    fn test_distinct_resources() {
        let mut summary = sample_summary();
        summary.findings.push(Finding::new(
            "https://example.com/b",
            "http://insecure.com/i.png",
        ));
        assert_eq!(summary.distinct_resources().len(), 3);
    }

    #[test]
    fn test_finish_reason_display() {
        assert_eq!(FinishReason::Exhausted.to_string(), "exhausted");
        assert_eq!(FinishReason::Interrupted.to_string(), "interrupted");
    }
}
