//! Queryable document handle
//!
//! A [`Document`] keeps the fetched markup, so the handle stays `Send` and can
//! be held across `.await` points. Queries run against a [`ParsedDocument`],
//! which parses the markup once and must stay inside synchronous code.
//! Traversal and extraction code only ever see selector queries, attribute
//! reads and text reads; the parsing engine stays behind this module.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Errors raised while querying a document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// A fetched page that can be queried by CSS selector
#[derive(Debug, Clone)]
pub struct Document {
    url: String,
    html: String,
}

impl Document {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    /// The URL this document was fetched from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parses the markup for a batch of queries
    pub fn parse(&self) -> ParsedDocument {
        ParsedDocument {
            tree: Html::parse_document(&self.html),
        }
    }

    /// Returns the raw `href` of every followable anchor, in document order
    pub fn links(&self) -> Vec<String> {
        self.parse().links()
    }
}

/// A parsed document tree
///
/// Not `Send`; parse, query and drop it without awaiting in between.
pub struct ParsedDocument {
    tree: Html,
}

impl ParsedDocument {
    /// Reads `attr` from every element matching `selector`
    ///
    /// Elements without the attribute are skipped.
    pub fn select_attr(&self, selector: &str, attr: &str) -> Result<Vec<String>, DocumentError> {
        let selector = parse_selector(selector)?;

        Ok(self
            .tree
            .select(&selector)
            .filter_map(|element| element.value().attr(attr))
            .map(|value| value.trim().to_string())
            .collect())
    }

    /// Reads the whitespace-collapsed text of every element matching `selector`
    ///
    /// Script and style contents are left out. Elements with no text are skipped.
    pub fn select_text(&self, selector: &str) -> Result<Vec<String>, DocumentError> {
        let selector = parse_selector(selector)?;

        Ok(self
            .tree
            .select(&selector)
            .map(collect_text)
            .filter(|text| !text.is_empty())
            .collect())
    }

    /// Returns the raw `href` of every followable anchor, in document order
    ///
    /// # Link Extraction Rules
    ///
    /// **Exclude:**
    /// - `<a href="..." download>`
    /// - `javascript:`, `mailto:`, `tel:` links
    /// - Data URIs
    /// - Fragment-only links (`#section`)
    pub fn links(&self) -> Vec<String> {
        let mut links = Vec::new();

        if let Ok(a_selector) = Selector::parse("a[href]") {
            for element in self.tree.select(&a_selector) {
                if element.value().attr("download").is_some() {
                    continue;
                }

                if let Some(href) = element.value().attr("href") {
                    if is_followable(href) {
                        links.push(href.trim().to_string());
                    }
                }
            }
        }

        links
    }
}

fn parse_selector(selector: &str) -> Result<Selector, DocumentError> {
    Selector::parse(selector).map_err(|e| DocumentError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Skips hrefs that can never lead to another page
fn is_followable(href: &str) -> bool {
    let href = href.trim();

    !(href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:"))
}

fn collect_text(element: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for node in element.descendants() {
        if let Some(text) = node.value().as_text() {
            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|e| e.name()))
                .map(|name| matches!(name, "script" | "style" | "noscript"))
                .unwrap_or(false);

            if !hidden {
                parts.push(text);
            }
        }
    }

    parts
        .iter()
        .flat_map(|part| part.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}
