//! URL handling module for News-Sieve
//!
//! This module provides link resolution against a site's base URL and the
//! per-site link rules that decide which links are traversed and which are
//! extracted as content.

mod matcher;
mod resolve;

// Re-export main types and functions
pub use matcher::LinkRules;
pub use resolve::{resolve_link, LinkResolver};

/// What the link rules say about a single resolved link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClass {
    /// Not navigable - ignored entirely
    Ignored,
    /// Navigable only - traversed for further links
    Navigable,
    /// Navigable and content - traversed and extracted
    Content,
}

impl LinkClass {
    /// Returns true if the link should be queued for traversal
    pub fn should_traverse(&self) -> bool {
        matches!(self, Self::Navigable | Self::Content)
    }

    /// Returns true if the link should be fetched for extraction
    pub fn should_extract(&self) -> bool {
        matches!(self, Self::Content)
    }
}

/// Classifies a resolved link according to the rules
///
/// The navigable check comes first: a link matching only the content pattern
/// is never reached by the traversal, so it is reported as ignored.
///
/// # Examples
///
/// ```
/// use news_sieve::url::{classify_link, LinkClass, LinkRules};
///
/// let rules = LinkRules::new(r"^https://example\.com/", r"/news/\d+$").unwrap();
/// assert_eq!(classify_link(&rules, "https://example.com/about"), LinkClass::Navigable);
/// assert_eq!(classify_link(&rules, "https://example.com/news/7"), LinkClass::Content);
/// assert_eq!(classify_link(&rules, "https://other.org/news/7"), LinkClass::Ignored);
/// ```
pub fn classify_link(rules: &LinkRules, link: &str) -> LinkClass {
    if !rules.is_navigable(link) {
        LinkClass::Ignored
    } else if rules.is_content(link) {
        LinkClass::Content
    } else {
        LinkClass::Navigable
    }
}
