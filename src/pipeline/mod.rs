//! Ingestion pipeline
//!
//! Extracted pages flow from the frontier through a bounded channel into a
//! pool of workers. Each worker classifies the page, applies the site's date
//! cutoff, and stores whatever survives.

mod pool;
mod worker;

pub use pool::WorkerPool;
pub use worker::{process_page, PageOutcome, WorkerContext};
