//! Crawler coordinator - main crawl orchestration logic
//!
//! This module wires the shared components together and runs the configured
//! sites one after another:
//! - Building the HTTP client, fetcher, classifier client and record store once
//! - Compiling every `[[site]]` entry before any traffic is sent
//! - Running one frontier and one worker pool per site
//! - Collecting statistics and honouring cancellation

use crate::classifier::{HttpClassifier, RelevanceClassifier};
use crate::config::{Config, CrawlerConfig, SiteConfig};
use crate::crawler::dedup::VisitedCache;
use crate::crawler::extract::{Extract, SelectorExtractor};
use crate::crawler::fetcher::{build_http_client, Fetcher, HttpFetcher};
use crate::crawler::frontier::{Frontier, TraversalSummary};
use crate::output::{CrawlStats, StatsSnapshot};
use crate::pipeline::{WorkerContext, WorkerPool};
use crate::retry::RetryPolicy;
use crate::storage::{RecordStore, SqliteStore};
use crate::{ConfigError, SieveError};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Initial backoff between page fetch attempts
const FETCH_BACKOFF: Duration = Duration::from_millis(500);

/// A site entry compiled and ready to crawl
#[derive(Debug, Clone)]
pub struct SitePlan {
    pub crawler: CrawlerConfig,
    pub extractor: SelectorExtractor,
}

impl SitePlan {
    fn compile(site: &SiteConfig, config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            crawler: CrawlerConfig::from_site(site, &config.crawler)?,
            extractor: SelectorExtractor::from_site(site),
        })
    }
}

/// Compiles every `[[site]]` entry, failing on the first invalid one
pub fn compile_sites(config: &Config) -> Result<Vec<SitePlan>, ConfigError> {
    config
        .sites
        .iter()
        .map(|site| SitePlan::compile(site, config))
        .collect()
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
    classifier: Arc<dyn RelevanceClassifier>,
    store: Arc<dyn RecordStore>,
    stats: Arc<CrawlStats>,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `cancel` - Token that stops the crawl when cancelled
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SieveError)` - Invalid classifier URL, or failed to build the HTTP client or open the database
    pub fn new(config: Config, cancel: CancellationToken) -> Result<Self, SieveError> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;

        let fetcher = HttpFetcher::new(
            client.clone(),
            RetryPolicy::new(config.crawler.fetch_max_attempts, FETCH_BACKOFF),
        );

        let classifier = HttpClassifier::from_settings(client, &config.classifier)?;
        tracing::info!("Classifier endpoint: {}", classifier.endpoint());

        let store = SqliteStore::open(Path::new(&config.storage.database_path))?.with_retry(
            RetryPolicy::new(
                config.storage.max_attempts,
                Duration::from_millis(config.storage.initial_backoff_ms),
            ),
        );
        tracing::info!("Storing articles in {}", config.storage.database_path);

        Ok(Self::with_components(
            config,
            Arc::new(fetcher),
            Arc::new(classifier),
            Arc::new(store),
            cancel,
        ))
    }

    /// Creates a coordinator around caller-supplied components
    pub fn with_components(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        classifier: Arc<dyn RelevanceClassifier>,
        store: Arc<dyn RecordStore>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
            classifier,
            store,
            stats: Arc::new(CrawlStats::default()),
            cancel,
        }
    }

    /// Live counters for this coordinator's crawl
    pub fn stats(&self) -> Arc<CrawlStats> {
        Arc::clone(&self.stats)
    }

    /// Crawls every configured site in order
    ///
    /// All sites are compiled before the first request, so a bad pattern or
    /// date in any entry fails the run without side effects.
    pub async fn run(&self) -> Result<StatsSnapshot, SieveError> {
        let plans = compile_sites(&self.config)?;
        let start_time = Instant::now();

        tracing::info!("Starting crawl of {} site(s)", plans.len());

        for plan in plans {
            if self.cancel.is_cancelled() {
                tracing::info!("Crawl cancelled, skipping remaining sites");
                break;
            }

            self.crawl_site(plan.crawler, Arc::new(plan.extractor)).await;
        }

        let snapshot = self.stats.snapshot();
        tracing::info!(
            "Crawl completed: {} pages traversed, {} stored in {:?}",
            snapshot.pages_traversed,
            snapshot.persisted,
            start_time.elapsed()
        );

        Ok(snapshot)
    }

    /// Runs one site's traversal and worker pool to completion
    ///
    /// The worker pool is stopped only after the frontier, and with it the last
    /// channel sender, has been dropped.
    pub async fn crawl_site(
        &self,
        site: CrawlerConfig,
        extractor: Arc<dyn Extract>,
    ) -> TraversalSummary {
        let site = Arc::new(site);
        tracing::info!(
            "Crawling {} ({} workers, cutoff {})",
            site.base_url,
            site.worker_count,
            site.date_cutoff
        );

        let context = WorkerContext {
            classifier: Arc::clone(&self.classifier),
            store: Arc::clone(&self.store),
            date_cutoff: site.date_cutoff,
            source_country: site.source_country.clone(),
            stats: Arc::clone(&self.stats),
        };

        let pool = WorkerPool::start(
            site.worker_count,
            self.config.crawler.channel_capacity,
            context,
            self.cancel.clone(),
        );

        let mut frontier = Frontier::new(
            Arc::clone(&site),
            Arc::clone(&self.fetcher),
            extractor,
            VisitedCache::with_capacity(self.config.crawler.cache_capacity),
            pool.sender(),
            self.cancel.clone(),
        );

        let summary = frontier.visit(&site.base_url).await;
        drop(frontier);

        pool.stop().await;
        self.stats.record_traversal(&summary);

        tracing::info!(
            "Finished {}: {} pages traversed, {} extracted, {} fetch failures",
            site.base_url,
            summary.pages_traversed,
            summary.pages_extracted,
            summary.fetch_failures
        );

        summary
    }
}

/// Runs the main crawl operation
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `cancel` - Token that stops the crawl when cancelled
///
/// # Returns
///
/// * `Ok(StatsSnapshot)` - Crawl finished (or was cancelled cleanly)
/// * `Err(SieveError)` - Startup failed
///
/// # Example
///
/// ```no_run
/// use news_sieve::config::load_config;
/// use news_sieve::crawler::run_crawl;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("sieve.toml"))?;
/// let stats = run_crawl(config, CancellationToken::new()).await?;
/// println!("{}", stats);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    cancel: CancellationToken,
) -> Result<StatsSnapshot, SieveError> {
    let coordinator = Coordinator::new(config, cancel)?;
    coordinator.run().await
}
