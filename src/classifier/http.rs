//! HTTP client for the classification service

use crate::classifier::{
    interpret_response, resolve_classifier_url, ClassifierError, ClassifierRequest,
    ClassifierResponse, RelevanceClassifier, CLASSIFIER_URL_ENV,
};
use crate::config::{validate_http_url, ClassifierSettings};
use crate::retry::{retry_async, RetryPolicy};
use crate::ConfigError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// [`RelevanceClassifier`] backed by `POST {base}/classify`
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl HttpClassifier {
    pub fn new(client: Client, base_url: &str, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            client,
            endpoint: format!("{}/classify", base_url.trim_end_matches('/')),
            timeout,
            retry,
        }
    }

    /// Builds a classifier from the `[classifier]` table, honouring `CLASSIFIER_URL`
    ///
    /// Fails when the address that wins is not an absolute http(s) URL.
    pub fn from_settings(client: Client, settings: &ClassifierSettings) -> Result<Self, ConfigError> {
        Self::with_override(client, settings, std::env::var(CLASSIFIER_URL_ENV).ok())
    }

    fn with_override(
        client: Client,
        settings: &ClassifierSettings,
        env: Option<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = resolve_classifier_url(env, settings.base_url.as_deref());
        validate_http_url(&base_url, "classifier URL")?;

        Ok(Self::new(
            client,
            &base_url,
            Duration::from_secs(settings.timeout_secs),
            RetryPolicy::new(
                settings.max_attempts,
                Duration::from_millis(settings.initial_backoff_ms),
            ),
        ))
    }

    /// The full URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn classify_once(&self, text: &str) -> Result<bool, ClassifierError> {
        let body = serde_json::to_vec(&ClassifierRequest { data: text })
            .map_err(|e| ClassifierError::Malformed(e.to_string()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let decoded: ClassifierResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ClassifierError::Malformed(e.to_string()))?;

        interpret_response(&decoded)
    }
}

#[async_trait]
impl RelevanceClassifier for HttpClassifier {
    async fn is_relevant(&self, text: &str) -> Result<bool, ClassifierError> {
        retry_async(&self.retry, "classify", move || self.classify_once(text)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn classifier(server: &MockServer, attempts: u32) -> HttpClassifier {
        HttpClassifier::new(
            Client::new(),
            &server.uri(),
            Duration::from_secs(5),
            RetryPolicy::new(attempts, Duration::from_millis(1)),
        )
    }

    async fn verdict(server: &MockServer, resp: &str) {
        Mock::given(method("POST"))
            .and(path("/classify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "resp": resp })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_sends_data_as_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/classify"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({ "data": "Breaking news" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "resp": "positive" })))
            .expect(1)
            .mount(&server)
            .await;

        assert!(classifier(&server, 1).is_relevant("Breaking news").await.unwrap());
    }

    #[tokio::test]
    async fn test_positive_any_casing() {
        let server = MockServer::start().await;
        verdict(&server, "Positive").await;

        assert!(classifier(&server, 1).is_relevant("text").await.unwrap());
    }

    #[tokio::test]
    async fn test_negative_verdict() {
        let server = MockServer::start().await;
        verdict(&server, "negative").await;

        assert!(!classifier(&server, 1).is_relevant("text").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_verdict_is_error() {
        let server = MockServer::start().await;
        verdict(&server, "").await;

        let result = classifier(&server, 3).is_relevant("text").await;
        assert!(matches!(result, Err(ClassifierError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_malformed_json_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;

        let result = classifier(&server, 3).is_relevant("text").await;
        assert!(matches!(result, Err(ClassifierError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        verdict(&server, "positive").await;

        assert!(classifier(&server, 3).is_relevant("text").await.unwrap());
    }

    #[tokio::test]
    async fn test_client_error_is_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let result = classifier(&server, 3).is_relevant("text").await;
        assert!(matches!(result, Err(ClassifierError::Status(400))));
    }

    #[test]
    fn test_endpoint_joins_path() {
        let classifier = HttpClassifier::new(
            Client::new(),
            "http://localhost:8000/",
            Duration::from_secs(1),
            RetryPolicy::no_retry(),
        );
        assert_eq!(classifier.endpoint(), "http://localhost:8000/classify");
    }

    #[test]
    fn test_environment_url_overrides_settings() {
        let settings = ClassifierSettings {
            base_url: Some("http://configured:9000".to_string()),
            ..ClassifierSettings::default()
        };

        let classifier = HttpClassifier::with_override(
            Client::new(),
            &settings,
            Some("http://from-env:8000/".to_string()),
        )
        .unwrap();
        assert_eq!(classifier.endpoint(), "http://from-env:8000/classify");
    }

    #[test]
    fn test_invalid_environment_url_is_rejected() {
        let settings = ClassifierSettings::default();

        for bad in ["not a url at all", "ftp://classifier.example.com"] {
            let result = HttpClassifier::with_override(Client::new(), &settings, Some(bad.to_string()));
            assert!(
                matches!(result, Err(ConfigError::InvalidUrl(_))),
                "{} should be rejected",
                bad
            );
        }
    }
}
