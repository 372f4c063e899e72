//! Breadth-first traversal of a single site
//!
//! The frontier is one sequential loop: pop a URL, fetch it, scan its anchors,
//! queue the navigable ones, and fetch-and-extract the content ones before
//! moving on to the next anchor. Content fetches therefore serialize with
//! traversal. Only extracted pages leave the loop, through the bounded
//! ingestion channel, which blocks the loop when the workers fall behind.
//!
//! Nothing here is shared: the dedup cache and the queue belong to the loop.

use crate::config::CrawlerConfig;
use crate::crawler::dedup::VisitedCache;
use crate::crawler::document::Document;
use crate::crawler::extract::{Extract, PageData};
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::url::classify_link;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// What one call to [`Frontier::visit`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalSummary {
    /// Pages fetched and scanned for links
    pub pages_traversed: u64,
    /// Fetches that failed, for traversal or extraction
    pub fetch_failures: u64,
    /// Pages handed to the ingestion channel
    pub pages_extracted: u64,
    /// Content pages the extraction callback declined
    pub extraction_failures: u64,
    /// URLs still queued when the traversal stopped
    pub queued_remaining: usize,
    /// Stopped by cancellation or a closed ingestion channel
    pub interrupted: bool,
}

enum Step {
    Continue,
    Stop,
}

/// Sequential BFS traversal engine
pub struct Frontier {
    config: Arc<CrawlerConfig>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extract>,
    visited: VisitedCache,
    queue: VecDeque<String>,
    ingest: mpsc::Sender<PageData>,
    cancel: CancellationToken,
}

impl Frontier {
    pub fn new(
        config: Arc<CrawlerConfig>,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extract>,
        visited: VisitedCache,
        ingest: mpsc::Sender<PageData>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            fetcher,
            extractor,
            visited,
            queue: VecDeque::new(),
            ingest,
            cancel,
        }
    }

    pub fn visited(&self) -> &VisitedCache {
        &self.visited
    }

    /// Drains the traversal queue starting from `seed`
    ///
    /// Fetch and extraction failures are logged and skipped; the traversal
    /// only stops early on cancellation or when the ingestion channel closes.
    pub async fn visit(&mut self, seed: &str) -> TraversalSummary {
        let mut summary = TraversalSummary::default();
        let start_time = Instant::now();

        self.queue.push_back(seed.to_string());
        tracing::info!("Starting traversal from {}", seed);

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("Traversal cancelled");
                summary.interrupted = true;
                break;
            }

            let Some(url) = self.queue.pop_front() else {
                tracing::info!("Frontier is empty, traversal complete");
                break;
            };

            if !self.visited.mark_traversed(&url) {
                tracing::trace!("Already traversed: {}", url);
                continue;
            }

            tracing::debug!("Processing URL: {}", url);

            let document = match self.fetch(&url).await {
                Some(Ok(document)) => document,
                Some(Err(e)) => {
                    tracing::warn!("Failed to fetch {}: {}", url, e);
                    summary.fetch_failures += 1;
                    continue;
                }
                None => {
                    summary.interrupted = true;
                    break;
                }
            };

            summary.pages_traversed += 1;

            if let Step::Stop = self.scan_links(&document, &mut summary).await {
                summary.interrupted = true;
                break;
            }

            if summary.pages_traversed % 10 == 0 {
                let elapsed = start_time.elapsed();
                let rate = summary.pages_traversed as f64 / elapsed.as_secs_f64();
                tracing::info!(
                    "Progress: {} pages traversed, {} extracted, {} in queue, {:.2} pages/sec",
                    summary.pages_traversed,
                    summary.pages_extracted,
                    self.queue.len(),
                    rate
                );
            }
        }

        summary.queued_remaining = self.queue.len();
        tracing::info!(
            "Traversal finished: {} pages traversed, {} extracted in {:?}",
            summary.pages_traversed,
            summary.pages_extracted,
            start_time.elapsed()
        );

        summary
    }

    /// Queues navigable links and extracts content links, in anchor order
    async fn scan_links(&mut self, document: &Document, summary: &mut TraversalSummary) -> Step {
        for href in document.links() {
            let link = self.config.resolve(&href);
            let class = classify_link(&self.config.rules, &link);

            if !class.should_traverse() {
                continue;
            }

            if self.visited.contains(&link) {
                continue;
            }

            self.queue.push_back(link.clone());

            if class.should_extract() {
                if let Step::Stop = self.extract_content(&link, summary).await {
                    return Step::Stop;
                }
            }
        }

        Step::Continue
    }

    /// Fetches a content link again, extracts it and hands the page to the workers
    async fn extract_content(&mut self, link: &str, summary: &mut TraversalSummary) -> Step {
        if !self.visited.mark_extracted(link) {
            return Step::Continue;
        }

        let document = match self.fetch(link).await {
            Some(Ok(document)) => document,
            Some(Err(e)) => {
                tracing::warn!("Failed to fetch content page {}: {}", link, e);
                summary.fetch_failures += 1;
                return Step::Continue;
            }
            None => return Step::Stop,
        };

        let page = match self.extractor.extract(&document) {
            Ok(page) => page,
            Err(e) => {
                tracing::debug!("Extraction declined for {}: {}", link, e);
                summary.extraction_failures += 1;
                return Step::Continue;
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Step::Stop,
            sent = self.ingest.send(page) => match sent {
                Ok(()) => {
                    summary.pages_extracted += 1;
                    Step::Continue
                }
                Err(_) => {
                    tracing::warn!("Ingestion channel closed, stopping traversal");
                    Step::Stop
                }
            },
        }
    }

    /// Fetches a URL unless cancellation arrives first
    async fn fetch(&self, url: &str) -> Option<Result<Document, FetchError>> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            result = self.fetcher.fetch(url) => Some(result),
        }
    }
}
