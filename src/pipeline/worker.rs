//! Per-item processing: classify, apply the date cutoff, store
//!
//! Every failure here is confined to the item that caused it. The worker
//! logs the outcome and moves on to the next item.

use crate::classifier::RelevanceClassifier;
use crate::crawler::PageData;
use crate::output::CrawlStats;
use crate::storage::{PutOutcome, RecordStore, ScrapedRecord};
use chrono::{NaiveDate, Utc};
use std::fmt;
use std::sync::Arc;

/// What happened to one extracted page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOutcome {
    /// Stored as a new row
    Persisted,
    /// Already stored under the same URL
    Duplicate,
    /// The classifier said no
    Irrelevant,
    /// Published before the site's date cutoff
    TooOld,
    /// Missing URL or text
    Malformed,
    /// The classifier could not be reached or answered badly
    ClassificationFailed,
    /// The store rejected the write after retries
    PersistenceFailed,
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Persisted => "persisted",
            Self::Duplicate => "duplicate",
            Self::Irrelevant => "irrelevant",
            Self::TooOld => "too old",
            Self::Malformed => "malformed",
            Self::ClassificationFailed => "classification failed",
            Self::PersistenceFailed => "persistence failed",
        };
        f.write_str(name)
    }
}

/// Everything a worker needs, shared by all workers of one site
#[derive(Clone)]
pub struct WorkerContext {
    pub classifier: Arc<dyn RelevanceClassifier>,
    pub store: Arc<dyn RecordStore>,
    pub date_cutoff: NaiveDate,
    pub source_country: String,
    pub stats: Arc<CrawlStats>,
}

/// Runs one page through the classification and persistence gates
///
/// # Arguments
///
/// * `ctx` - Shared gates and per-site settings
/// * `page` - The extracted page
///
/// # Returns
///
/// The outcome, already counted in `ctx.stats`
pub async fn process_page(ctx: &WorkerContext, page: PageData) -> PageOutcome {
    let outcome = evaluate(ctx, page).await;
    ctx.stats.record(outcome);
    outcome
}

async fn evaluate(ctx: &WorkerContext, page: PageData) -> PageOutcome {
    if page.is_malformed() {
        tracing::warn!("Skipping malformed page: url='{}'", page.url);
        return PageOutcome::Malformed;
    }

    match ctx.classifier.is_relevant(&page.text).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!("Not relevant: {}", page.url);
            return PageOutcome::Irrelevant;
        }
        Err(e) => {
            tracing::warn!("Classification failed for {}: {}", page.url, e);
            return PageOutcome::ClassificationFailed;
        }
    }

    if let Some(published) = page.published_date {
        if published.date_naive() < ctx.date_cutoff {
            tracing::debug!(
                "Published {} before cutoff {}: {}",
                published.date_naive(),
                ctx.date_cutoff,
                page.url
            );
            return PageOutcome::TooOld;
        }
    }

    let record = ScrapedRecord {
        text: page.text.trim().to_string(),
        url: page.url,
        source_country: ctx.source_country.clone(),
        scraped_at: Utc::now(),
        published_at: page.published_date,
        content_country: None,
    };

    match ctx.store.put(&record).await {
        Ok(PutOutcome::Inserted) => {
            tracing::info!("Stored {}", record.url);
            PageOutcome::Persisted
        }
        Ok(PutOutcome::Duplicate) => {
            tracing::debug!("Already stored: {}", record.url);
            PageOutcome::Duplicate
        }
        Err(e) => {
            tracing::warn!("Failed to store {}: {}", record.url, e);
            PageOutcome::PersistenceFailed
        }
    }
}
