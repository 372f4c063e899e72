use std::sync::Arc;

/// Caller-supplied hook that turns a raw `href` into an absolute link
///
/// When a site configures one, it replaces [`resolve_link`] entirely.
pub type LinkResolver = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Resolves an `href` against a site's base URL
///
/// Links starting with `/` are appended to the base URL (without doubling the
/// slash); protocol-relative links (`//host/path`) borrow the base URL's
/// scheme. Anything else is assumed to be absolute already and is returned
/// unchanged, so the link rules decide whether it is of any use.
///
/// # Examples
///
/// ```
/// use news_sieve::url::resolve_link;
///
/// assert_eq!(resolve_link("https://example.com", "/news/1"), "https://example.com/news/1");
/// assert_eq!(resolve_link("https://example.com/", "/news/1"), "https://example.com/news/1");
/// assert_eq!(resolve_link("https://example.com", "https://other.org/x"), "https://other.org/x");
/// ```
pub fn resolve_link(base_url: &str, href: &str) -> String {
    let href = href.trim();

    if let Some(rest) = href.strip_prefix("//") {
        let scheme = base_url.split("://").next().unwrap_or("https");
        return format!("{}://{}", scheme, rest);
    }

    if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        href.to_string()
    }
}
