//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing, resource classification and link extraction
//! - Exactly-once claiming of discovered pages
//! - Overall crawl coordination and termination

mod coordinator;
mod fetcher;
mod parser;
mod registry;
mod scheduler;

pub use coordinator::{run_crawl_with, Coordinator};
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpFetcher};
pub use parser::{parse_page, ParsedPage};
pub use registry::Registry;
pub use scheduler::{RetryPolicy, Scheduler};

use crate::config::Config;
use crate::output::{CrawlSummary, Reporter};
use crate::PlainsightError;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client from the user-agent and fetch settings
/// 2. Claim and fetch the seed page
/// 3. Report insecure resources as they are found
/// 4. Follow same-origin links until the termination policy fires
/// 5. Report the list of analyzed pages
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - The URL to start from
/// * `reporter` - Receives findings and the final summary
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl completed
/// * `Err(PlainsightError)` - Crawl could not start or report
pub async fn run_crawl(
    config: &Config,
    seed: &str,
    reporter: &mut dyn Reporter,
) -> Result<CrawlSummary, PlainsightError> {
    let fetcher = HttpFetcher::new(&config.user_agent, &config.fetch)?;
    run_crawl_with(&config.crawler, fetcher, seed, reporter).await
}
