//! Crawler module for site traversal and content extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Queryable documents and link enumeration
//! - The bounded dedup cache
//! - Breadth-first traversal with inline content extraction
//! - Overall crawl coordination

mod coordinator;
mod dedup;
mod document;
mod extract;
mod fetcher;
mod frontier;

pub use coordinator::{compile_sites, run_crawl, Coordinator, SitePlan};
pub use dedup::{VisitMark, VisitedCache, DEFAULT_CACHE_CAPACITY};
pub use document::{Document, DocumentError, ParsedDocument};
pub use extract::{parse_published_date, Extract, ExtractError, PageData, SelectorExtractor};
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpFetcher};
pub use frontier::{Frontier, TraversalSummary};
