//! Page Fetcher: one bounded-timeout GET per URL, no retries.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Carried in `AppState` as `Arc<dyn PageFetcher>` so crawls can run against
/// canned pages in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "fetching");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, routing::get, Router};

    use super::testing::StaticFetcher;
    use super::*;

    #[tokio::test]
    async fn test_static_fetcher_serves_pages_and_records_requests() {
        let fetcher = StaticFetcher::default().with_page("https://a/1", "<p>one</p>");

        assert_eq!(fetcher.fetch("https://a/1").await.unwrap(), "<p>one</p>");
        assert!(matches!(
            fetcher.fetch("https://a/2").await,
            Err(FetchError::Status { status: 404, .. })
        ));
        assert_eq!(fetcher.requests(), vec!["https://a/1", "https://a/2"]);
    }

    // ── HttpFetcher against a local server ──────────────────────────────────

    #[derive(Clone, Default)]
    struct Hits(Arc<AtomicUsize>);

    impl Hits {
        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    async fn spawn_site(hits: Hits) -> String {
        let app = Router::new()
            .route(
                "/ok",
                get(|State(h): State<Hits>| async move {
                    h.0.fetch_add(1, Ordering::SeqCst);
                    "<p>ok</p>"
                }),
            )
            .route(
                "/down",
                get(|State(h): State<Hits>| async move {
                    h.0.fetch_add(1, Ordering::SeqCst);
                    StatusCode::SERVICE_UNAVAILABLE
                }),
            )
            .route(
                "/slow",
                get(|State(h): State<Hits>| async move {
                    h.0.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "<p>late</p>"
                }),
            )
            .with_state(hits);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn http_fetcher(timeout: Duration) -> HttpFetcher {
        HttpFetcher::new(timeout, "Mozilla/5.0 (JobCrawler/1.0)").unwrap()
    }

    #[tokio::test]
    async fn test_http_fetcher_returns_body_on_success() {
        let hits = Hits::default();
        let base = spawn_site(hits.clone()).await;

        let body = http_fetcher(Duration::from_secs(5))
            .fetch(&format!("{base}/ok"))
            .await
            .unwrap();

        assert_eq!(body, "<p>ok</p>");
        assert_eq!(hits.count(), 1);
    }

    #[tokio::test]
    async fn test_http_fetcher_non_success_status_fails_without_retry() {
        let hits = Hits::default();
        let base = spawn_site(hits.clone()).await;

        let err = http_fetcher(Duration::from_secs(5))
            .fetch(&format!("{base}/down"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 503, .. }), "{err}");
        assert_eq!(hits.count(), 1);
    }

    #[tokio::test]
    async fn test_http_fetcher_timeout_fails_without_retry() {
        let hits = Hits::default();
        let base = spawn_site(hits.clone()).await;

        let err = http_fetcher(Duration::from_millis(200))
            .fetch(&format!("{base}/slow"))
            .await
            .unwrap_err();

        match &err {
            FetchError::Request { source, .. } => assert!(source.is_timeout(), "{err}"),
            other => panic!("expected a request failure, got {other}"),
        }
        assert_eq!(hits.count(), 1);
    }
}
