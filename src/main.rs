//! Plainsight main entry point
//!
//! This is the command-line interface for the Plainsight mixed-content crawler.

use anyhow::Context;
use clap::Parser;
use plainsight::config::{load_config_with_hash, validate, Config, TerminationPolicy};
use plainsight::crawler::{Coordinator, HttpFetcher};
use plainsight::output::{generate_markdown_summary, ConsoleReporter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Plainsight: find insecure resources on a secure site
///
/// Plainsight crawls every same-origin page reachable from the seed URL and
/// prints each image, frame or object that is loaded over plain HTTP.
#[derive(Parser, Debug)]
#[command(name = "plainsight")]
#[command(version)]
#[command(about = "Finds mixed content on a website", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "SEED_URL")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error log output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Maximum number of concurrent page fetches (0 means unbounded)
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Length of the idle window in milliseconds
    #[arg(long, value_name = "MS")]
    idle_window_ms: Option<u64>,

    /// How to decide that the crawl is over
    #[arg(long, value_enum)]
    termination: Option<TerminationPolicy>,

    /// Retries for transient fetch failures
    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    /// Also write a markdown report to this file
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(n) = self.concurrency {
            config.crawler.max_concurrent_fetches = n;
        }
        if let Some(ms) = self.idle_window_ms {
            config.crawler.idle_window_ms = ms;
        }
        if let Some(policy) = self.termination {
            config.crawler.termination = policy;
        }
        if let Some(n) = self.retries {
            config.crawler.fetch_retries = n;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    validate(&config).context("invalid configuration")?;

    let fetcher = HttpFetcher::new(&config.user_agent, &config.fetch)
        .context("failed to build HTTP client")?;
    let mut reporter = ConsoleReporter::stdout();

    let summary = Coordinator::new(&config.crawler, fetcher)
        .run_until(&cli.seed, &mut reporter, shutdown_signal())
        .await
        .map_err(|e| {
            tracing::error!("Crawl failed: {}", e);
            e
        })?;

    if let Some(path) = &cli.summary {
        generate_markdown_summary(&summary, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("Summary written to: {}", path.display());
    }

    Ok(())
}

/// Resolves on Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the report.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("plainsight=info,warn"),
            1 => EnvFilter::new("plainsight=debug,info"),
            2 => EnvFilter::new("plainsight=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
