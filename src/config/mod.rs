//! Configuration module for News-Sieve
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and compiling each `[[site]]` entry into a runnable [`CrawlerConfig`].
//!
//! # Example
//!
//! ```no_run
//! use news_sieve::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sieve.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.worker_count);
//! ```

mod parser;
mod site;
mod types;
mod validation;

// Re-export types
pub use site::{parse_date_cutoff, CrawlerConfig, DEFAULT_WORKER_COUNT};
pub use types::{
    ClassifierSettings, Config, CrawlerSettings, SiteConfig, StorageSettings, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

pub(crate) use validation::validate_http_url;
