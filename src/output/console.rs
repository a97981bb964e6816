//! Plain-text reporters
//!
//! `ConsoleReporter` streams findings as `<page>: <resource>` lines and ends
//! with the list of analyzed pages. `MemoryReporter` keeps everything in
//! memory for library callers and tests.

use crate::crawler::FetchError;
use crate::output::traits::{CrawlSummary, Finding, OutputResult, Reporter};
use std::io::{self, Write};

const RULE: &str = "-----";

/// Writes the report to any `Write` (stdout by default)
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    /// Reporter writing to standard output
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn begin(&mut self, _seed: &str) -> OutputResult<()> {
        writeln!(self.out, "{}", RULE)?;
        writeln!(self.out, "Insecure resources (page: resource):")?;
        writeln!(self.out, "{}", RULE)?;
        Ok(())
    }

    fn finding(&mut self, finding: &Finding) -> OutputResult<()> {
        writeln!(self.out, "{}", finding)?;
        // Findings should show up while the crawl is still running
        self.out.flush()?;
        Ok(())
    }

    fn finish(&mut self, summary: &CrawlSummary) -> OutputResult<()> {
        self.out.write_all(format_summary(summary).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Formats the end-of-crawl section of the console report
pub fn format_summary(summary: &CrawlSummary) -> String {
    let mut text = String::new();

    text.push_str(RULE);
    text.push('\n');
    text.push_str("Analyzed pages:\n");
    text.push_str(RULE);
    text.push('\n');
    for page in &summary.pages {
        text.push_str(page);
        text.push('\n');
    }

    if !summary.failures.is_empty() {
        text.push_str(RULE);
        text.push('\n');
        text.push_str("Failed pages:\n");
        text.push_str(RULE);
        text.push('\n');
        for (page, error) in &summary.failures {
            text.push_str(&format!("{} ({})\n", page, error));
        }
    }

    text.push_str(RULE);
    text.push('\n');
    text.push_str(&format!(
        "{} pages ({} without failure), {} findings, {} failures in {:.2}s ({})\n",
        summary.pages.len(),
        summary.pages_without_failure(),
        summary.findings.len(),
        summary.failures.len(),
        summary.duration.as_secs_f64(),
        summary.reason
    ));

    text
}

/// Collects everything it is told
#[derive(Debug, Default)]
pub struct MemoryReporter {
    pub seed: Option<String>,
    pub findings: Vec<Finding>,
    pub failures: Vec<(String, FetchError)>,
    pub summary: Option<CrawlSummary>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for MemoryReporter {
    fn begin(&mut self, seed: &str) -> OutputResult<()> {
        self.seed = Some(seed.to_string());
        Ok(())
    }

    fn finding(&mut self, finding: &Finding) -> OutputResult<()> {
        self.findings.push(finding.clone());
        Ok(())
    }

    fn fetch_failed(&mut self, url: &str, error: &FetchError) -> OutputResult<()> {
        self.failures.push((url.to_string(), error.clone()));
        Ok(())
    }

    fn finish(&mut self, summary: &CrawlSummary) -> OutputResult<()> {
        self.summary = Some(summary.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::traits::sample_summary;

    #[test]
    fn test_console_finding_lines() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.begin("https://example.com").unwrap();
        reporter
            .finding(&Finding::new(
                "https://example.com",
                "http://insecure.com/i.png",
            ))
            .unwrap();

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(output.starts_with("-----\nInsecure resources (page: resource):\n-----\n"));
        assert!(output.ends_with("https://example.com: http://insecure.com/i.png\n"));
    }

    #[test]
    fn test_format_summary_lists_pages() {
        let text = format_summary(&sample_summary());

        assert!(text.contains("Analyzed pages:\n-----\nhttps://example.com\nhttps://example.com/b\n"));
        assert!(text.contains("https://example.com/gone (HTTP 404)"));
        assert!(text.contains("3 pages (2 without failure), 3 findings, 1 failures"));
        assert!(text.contains("(exhausted)"));
    }

    #[test]
    fn test_format_summary_without_failures() {
        let mut summary = sample_summary();
        summary.failures.clear();
        let text = format_summary(&summary);
        assert!(!text.contains("Failed pages"));
    }

    #[test]
    fn test_console_finish_writes_summary() {
        let summary = sample_summary();
        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.finish(&summary).unwrap();
        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(output, format_summary(&summary));
    }

    #[test]
    fn test_memory_reporter_collects() {
        let mut reporter = MemoryReporter::new();
        reporter.begin("https://example.com").unwrap();
        reporter
            .finding(&Finding::new("https://example.com", "http://a.com/x.png"))
            .unwrap();
        reporter
            .fetch_failed("https://example.com/gone", &FetchError::Timeout)
            .unwrap();
        reporter.finish(&sample_summary()).unwrap();

        assert_eq!(reporter.seed.as_deref(), Some("https://example.com"));
        assert_eq!(reporter.findings.len(), 1);
        assert_eq!(reporter.failures.len(), 1);
        assert!(reporter.summary.is_some());
    }
}
