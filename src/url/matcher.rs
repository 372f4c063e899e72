use crate::ConfigError;
use regex::Regex;

/// The two link predicates configured for a site
///
/// `navigable` decides whether a link is worth fetching for further links,
/// `content` decides whether it is worth extracting as an article. The two
/// are independent; see [`crate::url::classify_link`] for how they combine.
#[derive(Debug, Clone)]
pub struct LinkRules {
    navigable: Regex,
    content: Regex,
}

impl LinkRules {
    /// Compiles both patterns
    ///
    /// # Arguments
    ///
    /// * `navigable` - Regular expression for links worth traversing
    /// * `content` - Regular expression for links worth extracting
    ///
    /// # Returns
    ///
    /// * `Ok(LinkRules)` - Both patterns compiled
    /// * `Err(ConfigError::InvalidPattern)` - One of the patterns is invalid
    ///
    /// # Examples
    ///
    /// ```
    /// use news_sieve::url::LinkRules;
    ///
    /// let rules = LinkRules::new(r"^https://example\.com/", r"/articles/").unwrap();
    /// assert!(rules.is_navigable("https://example.com/articles/1"));
    /// assert!(rules.is_content("https://example.com/articles/1"));
    /// assert!(!rules.is_content("https://example.com/about"));
    ///
    /// assert!(LinkRules::new("(unclosed", "x").is_err());
    /// ```
    pub fn new(navigable: &str, content: &str) -> Result<Self, ConfigError> {
        let navigable = Regex::new(navigable).map_err(|e| {
            ConfigError::InvalidPattern(format!("navigable pattern '{}': {}", navigable, e))
        })?;
        let content = Regex::new(content).map_err(|e| {
            ConfigError::InvalidPattern(format!("content pattern '{}': {}", content, e))
        })?;

        Ok(Self { navigable, content })
    }

    /// Returns true if the link is eligible for traversal
    pub fn is_navigable(&self, link: &str) -> bool {
        self.navigable.is_match(link)
    }

    /// Returns true if the link is eligible for extraction
    pub fn is_content(&self, link: &str) -> bool {
        self.content.is_match(link)
    }

    /// The navigable pattern source
    pub fn navigable_pattern(&self) -> &str {
        self.navigable.as_str()
    }

    /// The content pattern source
    pub fn content_pattern(&self) -> &str {
        self.content.as_str()
    }
}
