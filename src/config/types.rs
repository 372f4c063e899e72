use serde::Deserialize;

/// Main configuration structure for News-Sieve
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerSettings,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub classifier: ClassifierSettings,
    pub storage: StorageSettings,
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteConfig>,
}

/// Crawler behavior shared by every site
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerSettings {
    /// Number of concurrent ingestion workers
    #[serde(rename = "worker-count")]
    pub worker_count: usize,

    /// Capacity of the ingestion channel between frontier and workers
    #[serde(rename = "channel-capacity")]
    pub channel_capacity: usize,

    /// Maximum number of URLs remembered by the dedup cache
    #[serde(rename = "cache-capacity")]
    pub cache_capacity: usize,

    /// Per-request timeout for page fetches (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Attempts per page fetch, including the first
    #[serde(rename = "fetch-max-attempts")]
    pub fetch_max_attempts: u32,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            worker_count: 3,
            channel_capacity: 1000,
            cache_capacity: 10_000,
            request_timeout_secs: 30,
            fetch_max_attempts: 2,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Relevance classifier endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Base address of the classifier service; `CLASSIFIER_URL` overrides it
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    #[serde(rename = "initial-backoff-ms")]
    pub initial_backoff_ms: u64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
            max_attempts: 3,
            initial_backoff_ms: 500,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    #[serde(default = "default_storage_attempts", rename = "max-attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_storage_backoff", rename = "initial-backoff-ms")]
    pub initial_backoff_ms: u64,
}

fn default_storage_attempts() -> u32 {
    3
}

fn default_storage_backoff() -> u64 {
    200
}

/// One crawl target as written in the configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Seed URL, also the base for resolving `/`-relative links
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Regular expression for links worth traversing
    #[serde(rename = "navigable-pattern")]
    pub navigable_pattern: String,

    /// Regular expression for links worth extracting as articles
    #[serde(rename = "content-pattern")]
    pub content_pattern: String,

    /// Pages published before this date (YYYY-MM-DD) are discarded
    #[serde(rename = "date-cutoff")]
    pub date_cutoff: String,

    /// Country recorded as the source of every stored page
    #[serde(rename = "source-country")]
    pub source_country: String,

    /// Overrides `[crawler] worker-count` for this site
    #[serde(default, rename = "worker-count")]
    pub worker_count: Option<usize>,

    /// CSS selector whose text becomes the article body
    #[serde(default, rename = "text-selector")]
    pub text_selector: Option<String>,

    /// CSS selector locating the publication date
    #[serde(default, rename = "date-selector")]
    pub date_selector: Option<String>,

    /// Attribute of `date-selector` holding the date; element text if absent
    #[serde(default, rename = "date-attribute")]
    pub date_attribute: Option<String>,
}
