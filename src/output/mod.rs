//! Output module for reporting crawl results
//!
//! This module handles:
//! - Streaming findings to the console while the crawl runs
//! - Printing the list of analyzed pages when it ends
//! - Writing an optional markdown report

mod console;
mod markdown;
mod traits;

pub use console::{format_summary, ConsoleReporter, MemoryReporter};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use traits::{CrawlSummary, Finding, FinishReason, OutputError, OutputResult, Reporter};
