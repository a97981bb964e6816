//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Claiming the seed and every discovered link exactly once
//! - Spawning one crawl task per claimed URL
//! - Forwarding findings and fetch failures to the reporter
//! - Deciding when the crawl is finished
//! - Handling interrupts
//! - Producing the final summary

use crate::config::{CrawlerConfig, TerminationPolicy};
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::parser::parse_page;
use crate::crawler::registry::Registry;
use crate::crawler::scheduler::Scheduler;
use crate::output::{CrawlSummary, Finding, FinishReason, Reporter};
use crate::state::CrawlPhase;
use crate::url::normalize_seed;
use crate::PlainsightError;
use chrono::Utc;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Messages from crawl tasks to the coordinator
///
/// Every task sends `Finished` last, after all of its other events.
#[derive(Debug)]
enum TaskEvent {
    Finding(Finding),
    Link(String),
    Failed { url: String, error: FetchError },
    Finished { url: String, panicked: bool },
}

/// Sends `Finished` when a crawl task ends, including by panic or abort
struct FinishGuard {
    url: String,
    events: UnboundedSender<TaskEvent>,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        let _ = self.events.send(TaskEvent::Finished {
            url: std::mem::take(&mut self.url),
            panicked: std::thread::panicking(),
        });
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<F: Fetcher> {
    config: CrawlerConfig,
    fetcher: Arc<F>,
    scheduler: Arc<Scheduler>,
    registry: Registry,
    phase: CrawlPhase,
    /// Spawned tasks that have not sent `Finished` yet
    in_flight: usize,
    tasks: JoinSet<()>,
}

impl<F: Fetcher> Coordinator<F> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fetcher` - Retrieves page content for crawl tasks
    pub fn new(config: &CrawlerConfig, fetcher: F) -> Self {
        Self {
            config: config.clone(),
            fetcher: Arc::new(fetcher),
            scheduler: Arc::new(Scheduler::new(config)),
            registry: Registry::new(),
            phase: CrawlPhase::Idle,
            in_flight: 0,
            tasks: JoinSet::new(),
        }
    }

    /// Crawls from `seed` until the termination policy says the crawl is over
    pub async fn run(
        self,
        seed: &str,
        reporter: &mut dyn Reporter,
    ) -> Result<CrawlSummary, PlainsightError> {
        self.run_until(seed, reporter, std::future::pending::<()>()).await
    }

    /// Crawls from `seed` until finished or until `shutdown` completes
    ///
    /// This is the core crawling logic that:
    /// 1. Normalizes and claims the seed, spawns its task
    /// 2. Claims each discovered link; spawns a task for every new one
    /// 3. Streams findings to the reporter as they arrive
    /// 4. Stops when the policy fires or `shutdown` resolves
    /// 5. Aborts leftover tasks and reports the summary
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - Crawl finished (possibly interrupted)
    /// * `Err(PlainsightError)` - The seed was invalid or the summary could
    ///   not be reported
    pub async fn run_until<S>(
        mut self,
        seed: &str,
        reporter: &mut dyn Reporter,
        shutdown: S,
    ) -> Result<CrawlSummary, PlainsightError>
    where
        S: Future<Output = ()>,
    {
        let seed = normalize_seed(seed)?;
        let started_at = Utc::now();
        let clock = Instant::now();

        let (events_tx, mut events) = mpsc::unbounded_channel();
        let mut findings = Vec::new();
        let mut failures = BTreeMap::new();

        if let Err(e) = reporter.begin(&seed) {
            tracing::warn!("Reporter failed to start: {}", e);
        }

        // The registry is empty, so the seed claim always succeeds
        self.registry.claim(&seed);
        self.transition(CrawlPhase::Running)?;
        self.spawn_task(seed.clone(), &events_tx);

        tracing::info!(
            "Crawl started at {} (termination: {:?}, concurrency: {}, retries: {})",
            seed,
            self.config.termination,
            match self.scheduler.limit() {
                Some(n) => n.to_string(),
                None => "unbounded".to_string(),
            },
            self.scheduler.retry_policy().max_retries
        );

        let window = Duration::from_millis(self.config.idle_window_ms);
        let mut ticker = time::interval_at(Instant::now() + window, window);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // True once a full tick passed without a discovered link
        let mut quiet = false;
        tokio::pin!(shutdown);

        let reason = loop {
            tokio::select! {
                Some(event) = events.recv() => match event {
                    TaskEvent::Link(url) => {
                        quiet = false;
                        if self.registry.claim(&url) {
                            tracing::debug!("Claimed {}", url);
                            self.spawn_task(url, &events_tx);
                        }
                    }
                    TaskEvent::Finding(finding) => {
                        report_finding(reporter, &finding);
                        findings.push(finding);
                    }
                    TaskEvent::Failed { url, error } => {
                        report_failure(reporter, &url, &error);
                        failures.insert(url, error);
                    }
                    TaskEvent::Finished { url, panicked } => {
                        self.in_flight -= 1;
                        if panicked {
                            tracing::error!("Crawl task for {} panicked", url);
                        }
                        self.reap_finished();

                        if self.config.termination == TerminationPolicy::InFlight
                            && self.in_flight == 0
                        {
                            break FinishReason::Exhausted;
                        }
                    }
                },

                _ = ticker.tick() => match self.config.termination {
                    TerminationPolicy::IdleWindow if quiet => break FinishReason::IdleWindow,
                    TerminationPolicy::IdleWindow => quiet = true,
                    TerminationPolicy::InFlight => tracing::debug!(
                        "Progress: {} pages claimed, {} tasks in flight, {} free fetch slots, {:.1}s elapsed",
                        self.registry.len(),
                        self.in_flight,
                        self.scheduler
                            .available_permits()
                            .map_or_else(|| "unbounded".to_string(), |n| n.to_string()),
                        clock.elapsed().as_secs_f64()
                    ),
                },

                _ = &mut shutdown => {
                    tracing::info!("Interrupted, stopping crawl");
                    break FinishReason::Interrupted;
                }
            }
        };

        self.transition(CrawlPhase::Draining)?;
        self.drain(&mut events, reporter, &mut findings, &mut failures)
            .await;

        let summary = CrawlSummary {
            seed,
            started_at,
            duration: clock.elapsed(),
            reason,
            pages: self.registry.snapshot(),
            findings,
            failures,
        };
        self.transition(CrawlPhase::Done)?;
        debug_assert!(self.phase.is_terminal());

        tracing::info!(
            "Crawl completed ({}): {} pages analyzed, {} findings, {} failures in {:?}",
            summary.reason,
            summary.pages.len(),
            summary.findings.len(),
            summary.failures.len(),
            summary.duration
        );

        reporter.finish(&summary)?;
        Ok(summary)
    }

    fn transition(&mut self, to: CrawlPhase) -> Result<(), PlainsightError> {
        if !self.phase.can_transition_to(to) {
            return Err(PlainsightError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        tracing::debug!("Crawl phase {} -> {}", self.phase, to);
        self.phase = to;
        Ok(())
    }

    fn spawn_task(&mut self, url: String, events: &UnboundedSender<TaskEvent>) {
        self.in_flight += 1;
        self.tasks.spawn(crawl_page(
            url,
            Arc::clone(&self.fetcher),
            Arc::clone(&self.scheduler),
            events.clone(),
        ));
    }

    fn reap_finished(&mut self) {
        while self.tasks.try_join_next().is_some() {}
    }

    /// Aborts unfinished tasks and reports events they already sent
    ///
    /// Discovered links are dropped here; only `Running` accepts them.
    async fn drain(
        &mut self,
        events: &mut UnboundedReceiver<TaskEvent>,
        reporter: &mut dyn Reporter,
        findings: &mut Vec<Finding>,
        failures: &mut BTreeMap<String, FetchError>,
    ) {
        if self.in_flight > 0 {
            tracing::info!("Abandoning {} unfinished crawl tasks", self.in_flight);
        }
        self.tasks.abort_all();
        while self.tasks.join_next().await.is_some() {}

        let mut dropped = 0;
        while let Ok(event) = events.try_recv() {
            match event {
                TaskEvent::Finding(finding) => {
                    report_finding(reporter, &finding);
                    findings.push(finding);
                }
                TaskEvent::Failed { url, error } => {
                    report_failure(reporter, &url, &error);
                    failures.insert(url, error);
                }
                TaskEvent::Link(url) => {
                    debug_assert!(!self.phase.accepts_links());
                    if !self.registry.is_claimed(&url) {
                        dropped += 1;
                        tracing::trace!("Dropping unvisited link {}", url);
                    }
                }
                TaskEvent::Finished { .. } => {}
            }
        }
        if dropped > 0 {
            tracing::info!("{} links to unvisited pages were dropped", dropped);
        }
        self.in_flight = 0;
    }
}

fn report_finding(reporter: &mut dyn Reporter, finding: &Finding) {
    if let Err(e) = reporter.finding(finding) {
        tracing::warn!("Failed to report finding {}: {}", finding, e);
    }
}

fn report_failure(reporter: &mut dyn Reporter, url: &str, error: &FetchError) {
    tracing::warn!("Failed to fetch {}: {}", url, error);
    if let Err(e) = reporter.fetch_failed(url, error) {
        tracing::warn!("Failed to report fetch failure for {}: {}", url, e);
    }
}

/// One crawl task: fetch, parse, emit
async fn crawl_page<F: Fetcher>(
    url: String,
    fetcher: Arc<F>,
    scheduler: Arc<Scheduler>,
    events: UnboundedSender<TaskEvent>,
) {
    let _finished = FinishGuard {
        url: url.clone(),
        events: events.clone(),
    };

    let content = match scheduler.fetch(fetcher.as_ref(), &url).await {
        Ok(content) => content,
        Err(error) => {
            let _ = events.send(TaskEvent::Failed { url, error });
            return;
        }
    };

    let page = parse_page(&url, &content);
    tracing::debug!(
        "Parsed {}: {} insecure resources, {} links",
        url,
        page.resources.len(),
        page.links.len()
    );

    for resource in page.resources {
        let _ = events.send(TaskEvent::Finding(Finding::new(url.as_str(), resource)));
    }
    for link in page.links {
        let _ = events.send(TaskEvent::Link(link));
    }
}

/// Runs a crawl with the given fetcher and configuration
///
/// # Example
///
/// ```no_run
/// use plainsight::config::Config;
/// use plainsight::crawler::{run_crawl_with, HttpFetcher};
/// use plainsight::output::ConsoleReporter;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let fetcher = HttpFetcher::new(&config.user_agent, &config.fetch)?;
/// let mut reporter = ConsoleReporter::stdout();
/// let summary = run_crawl_with(&config.crawler, fetcher, "https://example.com", &mut reporter).await?;
/// println!("{} pages analyzed", summary.pages.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl_with<F: Fetcher>(
    config: &CrawlerConfig,
    fetcher: F,
    seed: &str,
    reporter: &mut dyn Reporter,
) -> Result<CrawlSummary, PlainsightError> {
    Coordinator::new(config, fetcher).run(seed, reporter).await
}
