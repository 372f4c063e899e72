//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for both the crawled site and the
//! classification service, and a temporary SQLite database for storage.

use news_sieve::classifier::CLASSIFIER_URL_ENV;
use news_sieve::config::load_config;
use news_sieve::crawler::Coordinator;
use news_sieve::output::StatsSnapshot;
use news_sieve::storage::SqliteStore;
use std::io::Write;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mock site, a mock classifier and a scratch directory for the database
struct Harness {
    site: MockServer,
    classifier: MockServer,
    dir: TempDir,
}

impl Harness {
    async fn start() -> Self {
        // The mock classifier is configured through the file; an exported override would win
        std::env::remove_var(CLASSIFIER_URL_ENV);

        Self {
            site: MockServer::start().await,
            classifier: MockServer::start().await,
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn base_url(&self) -> String {
        self.site.uri()
    }

    fn database_path(&self) -> std::path::PathBuf {
        self.dir.path().join("articles.db")
    }

    /// Serves `body` as HTML at `route`
    async fn page(&self, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(html(body))
            .mount(&self.site)
            .await;
    }

    /// Makes the classifier answer every request with `verdict`
    async fn verdict(&self, verdict: &str) {
        Mock::given(method("POST"))
            .and(path("/classify"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "resp": verdict })),
            )
            .mount(&self.classifier)
            .await;
    }

    /// Writes a config file for this harness; `crawler` is spliced into `[crawler]`
    fn write_config(&self, crawler: &str) -> std::path::PathBuf {
        let base = self.base_url();
        let content = format!(
            r#"
[crawler]
request-timeout-secs = 5
fetch-max-attempts = 1
{crawler}

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[classifier]
base-url = "{classifier}"
timeout-secs = 5
max-attempts = 2
initial-backoff-ms = 1

[storage]
database-path = '{database}'

[[site]]
base-url = "{base}"
navigable-pattern = '^{navigable}'
content-pattern = '^{navigable}/news/\d+$'
date-cutoff = "2023-12-31"
source-country = "US"
"#,
            crawler = crawler,
            classifier = self.classifier.uri(),
            database = self.database_path().display(),
            base = base,
            navigable = regex::escape(&base),
        );

        let config_path = self.dir.path().join("sieve.toml");
        let mut file = std::fs::File::create(&config_path).expect("Failed to create config");
        file.write_all(content.as_bytes())
            .expect("Failed to write config");
        config_path
    }

    async fn crawl(&self, crawler: &str) -> StatsSnapshot {
        self.crawl_with(crawler, CancellationToken::new()).await
    }

    async fn crawl_with(&self, crawler: &str, cancel: CancellationToken) -> StatsSnapshot {
        let config = load_config(&self.write_config(crawler)).expect("Config should be valid");
        let coordinator = Coordinator::new(config, cancel).expect("Failed to create coordinator");
        coordinator.run().await.expect("Crawl should complete")
    }

    fn store(&self) -> SqliteStore {
        SqliteStore::open(&self.database_path()).expect("Failed to open database")
    }

    async fn requests_for(&self, route: &str) -> usize {
        self.site
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == route)
            .count()
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

fn article(text: &str, published: &str) -> String {
    format!(
        r#"<html><head>
        <meta property="article:published_time" content="{}">
        </head><body><p>{}</p></body></html>"#,
        published, text
    )
}

#[tokio::test]
async fn test_relevant_recent_article_is_stored() {
    let h = Harness::start().await;
    h.page("/", r#"<html><body><a href="/news/1">Story</a></body></html>"#)
        .await;
    h.page("/news/1", &article("Breaking news", "2024-01-01"))
        .await;
    h.verdict("positive").await;

    let stats = h.crawl("").await;

    let store = h.store();
    assert_eq!(store.count().await.unwrap(), 1);

    let url = format!("{}/news/1", h.base_url());
    let record = store
        .get_by_url(&url)
        .await
        .unwrap()
        .expect("Record should be stored");
    assert_eq!(record.text, "Breaking news");
    assert_eq!(record.source_country, "US");
    assert_eq!(
        record.published_at.map(|d| d.date_naive().to_string()),
        Some("2024-01-01".to_string())
    );
    assert_eq!(record.content_country, None);

    assert_eq!(stats.persisted, 1);
    assert_eq!(stats.pages_extracted, 1);
}

#[tokio::test]
async fn test_negative_verdict_stores_nothing() {
    let h = Harness::start().await;
    h.page("/", r#"<html><body><a href="/news/1">Story</a></body></html>"#)
        .await;
    h.page("/news/1", &article("Breaking news", "2024-01-01"))
        .await;
    h.verdict("negative").await;

    let stats = h.crawl("").await;

    assert_eq!(h.store().count().await.unwrap(), 0);
    assert_eq!(stats.irrelevant, 1);
}

#[tokio::test]
async fn test_old_article_skipped_and_worker_continues() {
    let h = Harness::start().await;
    h.page(
        "/",
        r#"<html><body>
            <a href="/news/1">Old</a>
            <a href="/news/2">New</a>
        </body></html>"#,
    )
    .await;
    h.page("/news/1", &article("Old news", "2023-01-01")).await;
    h.page("/news/2", &article("Fresh news", "2024-02-02")).await;
    h.verdict("positive").await;

    // A single worker has to handle both items in turn
    let stats = h.crawl("worker-count = 1").await;

    let store = h.store();
    assert_eq!(store.count().await.unwrap(), 1);
    assert!(store
        .get_by_url(&format!("{}/news/1", h.base_url()))
        .await
        .unwrap()
        .is_none());
    assert!(store
        .get_by_url(&format!("{}/news/2", h.base_url()))
        .await
        .unwrap()
        .is_some());
    assert_eq!(stats.too_old, 1);
    assert_eq!(stats.persisted, 1);
}

#[tokio::test]
async fn test_evicted_url_is_fetched_again() {
    let h = Harness::start().await;
    h.page(
        "/",
        r#"<html><body><a href="/a">A</a><a href="/b">B</a></body></html>"#,
    )
    .await;
    h.page("/a", "<html><body>A</body></html>").await;
    h.page("/b", r#"<html><body><a href="/a">Back to A</a></body></html>"#)
        .await;
    h.verdict("positive").await;

    h.crawl("cache-capacity = 1").await;

    assert_eq!(h.requests_for("/a").await, 2);
    assert_eq!(h.requests_for("/b").await, 1);
}

#[tokio::test]
async fn test_large_cache_fetches_each_page_once() {
    let h = Harness::start().await;
    h.page(
        "/",
        r#"<html><body><a href="/a">A</a><a href="/b">B</a></body></html>"#,
    )
    .await;
    h.page("/a", r#"<html><body><a href="/b">B</a></body></html>"#)
        .await;
    h.page("/b", r#"<html><body><a href="/a">A</a></body></html>"#)
        .await;
    h.verdict("positive").await;

    let stats = h.crawl("").await;

    assert_eq!(h.requests_for("/a").await, 1);
    assert_eq!(h.requests_for("/b").await, 1);
    assert_eq!(stats.pages_traversed, 3);
    assert_eq!(stats.pages_extracted, 0);
}

#[tokio::test]
async fn test_second_run_does_not_duplicate() {
    let h = Harness::start().await;
    h.page("/", r#"<html><body><a href="/news/1">Story</a></body></html>"#)
        .await;
    h.page("/news/1", &article("Breaking news", "2024-01-01"))
        .await;
    h.verdict("positive").await;

    let first = h.crawl("").await;
    let second = h.crawl("").await;

    assert_eq!(first.persisted, 1);
    assert_eq!(second.persisted, 0);
    assert_eq!(second.duplicates, 1);
    assert_eq!(h.store().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_broken_links_do_not_stop_crawl() {
    let h = Harness::start().await;
    h.page(
        "/",
        r#"<html><body>
            <a href="/news/404">Gone</a>
            <a href="/section">Section</a>
        </body></html>"#,
    )
    .await;
    h.page("/section", r#"<html><body><a href="/news/7">Story</a></body></html>"#)
        .await;
    h.page("/news/7", &article("Deep story", "2024-03-03")).await;
    Mock::given(method("GET"))
        .and(path("/news/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&h.site)
        .await;
    h.verdict("positive").await;

    let stats = h.crawl("").await;

    assert!(stats.fetch_failures >= 1);
    assert_eq!(stats.persisted, 1);
    assert!(h
        .store()
        .get_by_url(&format!("{}/news/7", h.base_url()))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_classifier_outage_stores_nothing() {
    let h = Harness::start().await;
    h.page("/", r#"<html><body><a href="/news/1">Story</a></body></html>"#)
        .await;
    h.page("/news/1", &article("Breaking news", "2024-01-01"))
        .await;
    Mock::given(method("POST"))
        .and(path("/classify"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.classifier)
        .await;

    let stats = h.crawl("").await;

    assert_eq!(h.store().count().await.unwrap(), 0);
    assert_eq!(stats.classification_failures, 1);
}

#[tokio::test]
async fn test_cancelled_crawl_sends_no_requests() {
    let h = Harness::start().await;
    h.page("/", r#"<html><body><a href="/news/1">Story</a></body></html>"#)
        .await;
    h.verdict("positive").await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let stats = h.crawl_with("", cancel).await;

    assert_eq!(stats.pages_traversed, 0);
    assert_eq!(h.requests_for("/").await, 0);
}
