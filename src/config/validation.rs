use crate::config::site::CrawlerConfig;
use crate::config::types::{
    ClassifierSettings, Config, CrawlerSettings, SiteConfig, StorageSettings, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

const MAX_WORKERS: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_settings(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_classifier_settings(&config.classifier)?;
    validate_storage_settings(&config.storage)?;
    validate_sites(&config.sites, &config.crawler)?;
    Ok(())
}

/// Validates crawler settings
fn validate_crawler_settings(config: &CrawlerSettings) -> Result<(), ConfigError> {
    validate_worker_count(config.worker_count)?;

    if config.channel_capacity < 1 {
        return Err(ConfigError::Validation(
            "channel_capacity must be >= 1".to_string(),
        ));
    }

    if config.cache_capacity < 1 {
        return Err(ConfigError::Validation(
            "cache_capacity must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.fetch_max_attempts < 1 {
        return Err(ConfigError::Validation(
            "fetch_max_attempts must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_worker_count(worker_count: usize) -> Result<(), ConfigError> {
    if worker_count < 1 || worker_count > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "worker_count must be between 1 and {}, got {}",
            MAX_WORKERS, worker_count
        )));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates classifier settings
fn validate_classifier_settings(config: &ClassifierSettings) -> Result<(), ConfigError> {
    if let Some(base_url) = &config.base_url {
        validate_http_url(base_url, "classifier base_url")?;
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "classifier max_attempts must be >= 1".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "classifier timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates storage settings
fn validate_storage_settings(config: &StorageSettings) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "storage max_attempts must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates every site entry, compiling patterns and selectors
fn validate_sites(sites: &[SiteConfig], defaults: &CrawlerSettings) -> Result<(), ConfigError> {
    if sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[site]] entry is required".to_string(),
        ));
    }

    for site in sites {
        validate_http_url(&site.base_url, "site base_url")?;

        if site.source_country.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Site '{}' must have a source_country",
                site.base_url
            )));
        }

        if let Some(worker_count) = site.worker_count {
            validate_worker_count(worker_count)?;
        }

        // Compiles both patterns and parses the cutoff
        CrawlerConfig::from_site(site, defaults)?;

        for selector in [&site.text_selector, &site.date_selector]
            .into_iter()
            .flatten()
        {
            Selector::parse(selector).map_err(|e| {
                ConfigError::Validation(format!("Invalid CSS selector '{}': {:?}", selector, e))
            })?;
        }

        if site.date_attribute.is_some() && site.date_selector.is_none() {
            return Err(ConfigError::Validation(format!(
                "Site '{}' sets date_attribute without date_selector",
                site.base_url
            )));
        }
    }

    Ok(())
}

/// Validates an absolute http(s) URL
pub(crate) fn validate_http_url(value: &str, what: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            what, value
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig {
            base_url: "https://example.com".to_string(),
            navigable_pattern: "^https://example.com/".to_string(),
            content_pattern: "/news/".to_string(),
            date_cutoff: "2024-01-01".to_string(),
            source_country: "AU".to_string(),
            worker_count: None,
            text_selector: Some("article p".to_string()),
            date_selector: None,
            date_attribute: None,
        }
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("https://example.com", "x").is_ok());
        assert!(validate_http_url("http://10.0.0.1:8000", "x").is_ok());
        assert!(validate_http_url("ftp://example.com", "x").is_err());
        assert!(validate_http_url("example.com", "x").is_err());
    }

    #[test]
    fn test_valid_site_passes() {
        assert!(validate_sites(&[site()], &CrawlerSettings::default()).is_ok());
    }

    #[test]
    fn test_no_sites_rejected() {
        assert!(validate_sites(&[], &CrawlerSettings::default()).is_err());
    }

    #[test]
    fn test_site_without_country_rejected() {
        let mut site = site();
        site.source_country = "  ".to_string();
        assert!(validate_sites(&[site], &CrawlerSettings::default()).is_err());
    }

    #[test]
    fn test_site_bad_selector_rejected() {
        let mut site = site();
        site.text_selector = Some("p[".to_string());
        let err = validate_sites(&[site], &CrawlerSettings::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_date_attribute_requires_selector() {
        let mut site = site();
        site.date_attribute = Some("content".to_string());
        assert!(validate_sites(&[site], &CrawlerSettings::default()).is_err());
    }

    #[test]
    fn test_worker_count_bounds() {
        assert!(validate_worker_count(1).is_ok());
        assert!(validate_worker_count(MAX_WORKERS).is_ok());
        assert!(validate_worker_count(0).is_err());
        assert!(validate_worker_count(MAX_WORKERS + 1).is_err());
    }
}
