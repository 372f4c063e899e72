use crate::config::types::{CrawlerSettings, SiteConfig};
use crate::url::{resolve_link, LinkResolver, LinkRules};
use crate::ConfigError;
use chrono::NaiveDate;
use std::fmt;

/// Worker count used when neither the site nor `[crawler]` sets one
pub const DEFAULT_WORKER_COUNT: usize = 3;

/// Compiled, ready-to-run configuration for crawling one site
///
/// Built from a [`SiteConfig`] by [`CrawlerConfig::from_site`], or directly by
/// library callers that want a custom [`LinkResolver`].
#[derive(Clone)]
pub struct CrawlerConfig {
    pub base_url: String,
    pub rules: LinkRules,
    pub date_cutoff: NaiveDate,
    pub worker_count: usize,
    pub source_country: String,
    pub resolver: Option<LinkResolver>,
}

impl CrawlerConfig {
    /// Creates a site configuration with the default worker count and no resolver hook
    pub fn new(
        base_url: impl Into<String>,
        navigable_pattern: &str,
        content_pattern: &str,
        date_cutoff: NaiveDate,
        source_country: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: base_url.into(),
            rules: LinkRules::new(navigable_pattern, content_pattern)?,
            date_cutoff,
            worker_count: DEFAULT_WORKER_COUNT,
            source_country: source_country.into(),
            resolver: None,
        })
    }

    /// Compiles a configuration-file site entry
    ///
    /// The site's own `worker-count` wins over the crawler-wide setting.
    pub fn from_site(site: &SiteConfig, defaults: &CrawlerSettings) -> Result<Self, ConfigError> {
        let date_cutoff = parse_date_cutoff(&site.date_cutoff)?;
        let config = Self::new(
            site.base_url.clone(),
            &site.navigable_pattern,
            &site.content_pattern,
            date_cutoff,
            site.source_country.clone(),
        )?;

        Ok(config.with_worker_count(site.worker_count.unwrap_or(defaults.worker_count)))
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_resolver(mut self, resolver: LinkResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Turns a raw `href` into an absolute link using the hook if present
    pub fn resolve(&self, href: &str) -> String {
        match &self.resolver {
            Some(resolver) => resolver(href),
            None => resolve_link(&self.base_url, href),
        }
    }
}

impl fmt::Debug for CrawlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlerConfig")
            .field("base_url", &self.base_url)
            .field("rules", &self.rules)
            .field("date_cutoff", &self.date_cutoff)
            .field("worker_count", &self.worker_count)
            .field("source_country", &self.source_country)
            .field("resolver", &self.resolver.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

/// Parses a `YYYY-MM-DD` date cutoff
pub fn parse_date_cutoff(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| ConfigError::InvalidDate(format!("'{}': {}", value, e)))
}
