//! Relevance classification gate
//!
//! Article text is sent to an external HTTP service that answers with a
//! one-word verdict. Only `"positive"` (any casing) counts as relevant.
//!
//! The endpoint base URL is resolved in this order:
//! 1. The `CLASSIFIER_URL` environment variable
//! 2. `[classifier] base-url` in the configuration file
//! 3. [`DEFAULT_CLASSIFIER_URL`]

mod http;

pub use http::HttpClassifier;

use crate::retry::Transient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classifier base URL used when nothing else is configured
pub const DEFAULT_CLASSIFIER_URL: &str = "http://178.128.134.67";

/// Environment variable overriding the classifier base URL
pub const CLASSIFIER_URL_ENV: &str = "CLASSIFIER_URL";

/// Errors that can occur while asking the classifier for a verdict
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Classifier returned HTTP {0}")]
    Status(u16),

    #[error("Malformed classifier response: {0}")]
    Malformed(String),

    #[error("Classifier returned an empty verdict")]
    EmptyResponse,
}

impl Transient for ClassifierError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Request(e) => !e.is_builder() && !e.is_decode(),
            Self::Status(status) => *status >= 500 || *status == 429,
            Self::Malformed(_) | Self::EmptyResponse => false,
        }
    }
}

/// Request body sent to `POST {base}/classify`
#[derive(Debug, Serialize)]
pub struct ClassifierRequest<'a> {
    pub data: &'a str,
}

/// Response body returned by the classifier
#[derive(Debug, Deserialize)]
pub struct ClassifierResponse {
    pub resp: String,
}

/// Capability to decide whether an article is relevant
#[async_trait]
pub trait RelevanceClassifier: Send + Sync {
    async fn is_relevant(&self, text: &str) -> Result<bool, ClassifierError>;
}

/// Turns a decoded response into a verdict
///
/// An empty verdict is an error rather than a "no".
pub fn interpret_response(response: &ClassifierResponse) -> Result<bool, ClassifierError> {
    if response.resp.is_empty() {
        return Err(ClassifierError::EmptyResponse);
    }

    Ok(response.resp.eq_ignore_ascii_case("positive"))
}

/// Picks the classifier base URL from the environment, the config file, or the default
///
/// Empty values are ignored so an exported-but-blank variable does not win.
pub fn resolve_classifier_url(env: Option<String>, configured: Option<&str>) -> String {
    env.filter(|url| !url.trim().is_empty())
        .or_else(|| {
            configured
                .filter(|url| !url.trim().is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_CLASSIFIER_URL.to_string())
        .trim()
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(resp: &str) -> ClassifierResponse {
        ClassifierResponse {
            resp: resp.to_string(),
        }
    }

    #[test]
    fn test_positive_any_casing_is_relevant() {
        assert!(interpret_response(&response("positive")).unwrap());
        assert!(interpret_response(&response("Positive")).unwrap());
        assert!(interpret_response(&response("POSITIVE")).unwrap());
    }

    #[test]
    fn test_other_verdicts_are_not_relevant() {
        assert!(!interpret_response(&response("negative")).unwrap());
        assert!(!interpret_response(&response("neutral")).unwrap());
        assert!(!interpret_response(&response(" positive")).unwrap());
    }

    #[test]
    fn test_empty_verdict_is_error() {
        assert!(matches!(
            interpret_response(&response("")),
            Err(ClassifierError::EmptyResponse)
        ));
    }

    #[test]
    fn test_request_serializes_as_data() {
        let body = serde_json::to_string(&ClassifierRequest { data: "hello" }).unwrap();
        assert_eq!(body, r#"{"data":"hello"}"#);
    }

    #[test]
    fn test_url_resolution_order() {
        assert_eq!(
            resolve_classifier_url(Some("http://env:1".to_string()), Some("http://file:2")),
            "http://env:1"
        );
        assert_eq!(
            resolve_classifier_url(None, Some("http://file:2/")),
            "http://file:2"
        );
        assert_eq!(resolve_classifier_url(None, None), DEFAULT_CLASSIFIER_URL);
        assert_eq!(
            resolve_classifier_url(Some("  ".to_string()), None),
            DEFAULT_CLASSIFIER_URL
        );
    }

    #[test]
    fn test_transient_statuses() {
        assert!(ClassifierError::Status(503).is_transient());
        assert!(ClassifierError::Status(429).is_transient());
        assert!(!ClassifierError::Status(400).is_transient());
        assert!(!ClassifierError::EmptyResponse.is_transient());
        assert!(!ClassifierError::Malformed("x".to_string()).is_transient());
    }
}
