//! Bounded record of visited URLs
//!
//! The cache remembers, per URL, whether it has been traversed for links and
//! whether it has been fetched for extraction. Both marks are set through
//! check-then-mark methods that report whether the mark is new, so the caller
//! never has a window between the check and the update.
//!
//! Capacity is bounded; on overflow the least recently accessed URL is
//! forgotten and may be visited again later. Storage is idempotent, so a
//! re-visit costs a fetch and nothing more.

use lru::LruCache;
use std::num::NonZeroUsize;

/// Default number of URLs remembered
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// What has already happened to a URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitMark {
    /// Fetched and scanned for links
    pub traversed: bool,
    /// Fetched and handed to the extraction callback
    pub extracted: bool,
}

/// LRU-bounded set of visited URLs, owned by a single frontier
pub struct VisitedCache {
    entries: LruCache<String, VisitMark>,
}

impl VisitedCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Like [`VisitedCache::new`], treating zero as one
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN))
    }

    /// Returns true if the URL is known in any way; counts as an access
    pub fn contains(&mut self, url: &str) -> bool {
        self.entries.get(url).is_some()
    }

    /// Marks the URL traversed; false if it already was
    pub fn mark_traversed(&mut self, url: &str) -> bool {
        self.mark_with(url, |mark| {
            let fresh = !mark.traversed;
            mark.traversed = true;
            fresh
        })
    }

    /// Marks the URL extracted; false if it already was
    pub fn mark_extracted(&mut self, url: &str) -> bool {
        self.mark_with(url, |mark| {
            let fresh = !mark.extracted;
            mark.extracted = true;
            fresh
        })
    }

    /// Current mark without touching recency
    pub fn peek(&self, url: &str) -> Option<VisitMark> {
        self.entries.peek(url).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    fn mark_with(&mut self, url: &str, update: impl FnOnce(&mut VisitMark) -> bool) -> bool {
        if let Some(mark) = self.entries.get_mut(url) {
            return update(mark);
        }

        let mut mark = VisitMark::default();
        let fresh = update(&mut mark);
        self.entries.put(url.to_string(), mark);
        fresh
    }
}

impl Default for VisitedCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}
