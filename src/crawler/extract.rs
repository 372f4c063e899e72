//! Turning fetched content pages into [`PageData`]
//!
//! The frontier hands every fetched content link to an [`Extract`]
//! implementation. Any `Fn(&Document) -> Result<PageData, ExtractError>` works;
//! [`SelectorExtractor`] is the configuration-driven default.

use crate::config::SiteConfig;
use crate::crawler::document::{Document, DocumentError, ParsedDocument};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// Where to look for a publication date when the site configures none
const DEFAULT_DATE_SOURCES: &[(&str, Option<&str>)] = &[
    ("meta[property='article:published_time']", Some("content")),
    ("meta[name='date']", Some("content")),
    ("time[datetime]", Some("datetime")),
];

/// An extracted article, produced once per content link and consumed by one worker
#[derive(Debug, Clone, PartialEq)]
pub struct PageData {
    pub url: String,
    pub text: String,
    pub published_date: Option<DateTime<Utc>>,
}

impl PageData {
    pub fn new(
        url: impl Into<String>,
        text: impl Into<String>,
        published_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            published_date,
        }
    }

    /// An item with no URL or no text cannot be classified or stored
    pub fn is_malformed(&self) -> bool {
        self.url.trim().is_empty() || self.text.trim().is_empty()
    }
}

/// Reasons an extraction callback declines a document
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No text found in {url}")]
    EmptyText { url: String },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Extraction declined: {0}")]
    Declined(String),
}

/// Caller-supplied extraction callback
pub trait Extract: Send + Sync {
    fn extract(&self, document: &Document) -> Result<PageData, ExtractError>;
}

impl<F> Extract for F
where
    F: Fn(&Document) -> Result<PageData, ExtractError> + Send + Sync,
{
    fn extract(&self, document: &Document) -> Result<PageData, ExtractError> {
        self(document)
    }
}

/// Extracts article text and publication date with CSS selectors
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    text_selector: String,
    date_sources: Vec<(String, Option<String>)>,
}

impl SelectorExtractor {
    /// Creates an extractor reading text from `text_selector` and dates from the defaults
    pub fn new(text_selector: impl Into<String>) -> Self {
        Self {
            text_selector: text_selector.into(),
            date_sources: DEFAULT_DATE_SOURCES
                .iter()
                .map(|(selector, attr)| (selector.to_string(), attr.map(str::to_string)))
                .collect(),
        }
    }

    /// Replaces the date lookup with a single selector
    ///
    /// With `attribute` unset, the element's text is parsed instead.
    pub fn with_date_source(mut self, selector: impl Into<String>, attribute: Option<String>) -> Self {
        self.date_sources = vec![(selector.into(), attribute)];
        self
    }

    /// Builds the extractor described by a `[[site]]` entry
    pub fn from_site(site: &SiteConfig) -> Self {
        let extractor = Self::new(site.text_selector.as_deref().unwrap_or("body"));

        match &site.date_selector {
            Some(selector) => extractor.with_date_source(selector.clone(), site.date_attribute.clone()),
            None => extractor,
        }
    }

    fn published_date(&self, document: &ParsedDocument) -> Result<Option<DateTime<Utc>>, DocumentError> {
        for (selector, attribute) in &self.date_sources {
            let values = match attribute {
                Some(attribute) => document.select_attr(selector, attribute)?,
                None => document.select_text(selector)?,
            };

            if let Some(date) = values.iter().find_map(|v| parse_published_date(v)) {
                return Ok(Some(date));
            }
        }

        Ok(None)
    }
}

impl Default for SelectorExtractor {
    fn default() -> Self {
        Self::new("body")
    }
}

impl Extract for SelectorExtractor {
    fn extract(&self, document: &Document) -> Result<PageData, ExtractError> {
        let parsed = document.parse();
        let text = parsed.select_text(&self.text_selector)?.join("\n");

        if text.trim().is_empty() {
            return Err(ExtractError::EmptyText {
                url: document.url().to_string(),
            });
        }

        let published_date = self.published_date(&parsed)?;

        Ok(PageData::new(document.url(), text, published_date))
    }
}

/// Parses the date formats commonly found in article markup
///
/// Accepts RFC 3339, RFC 2822, naive `YYYY-MM-DD HH:MM:SS` timestamps (taken as
/// UTC), and plain `YYYY-MM-DD` dates (taken as midnight UTC).
pub fn parse_published_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }

    if let Ok(date) = DateTime::parse_from_rfc2822(raw) {
        return Some(date.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(date.and_utc());
        }
    }

    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}
