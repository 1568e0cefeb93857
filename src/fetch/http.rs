// src/fetch/http.rs
// =============================================================================
// This module fetches pages over HTTP for the crawler.
//
// Key functionality:
// - One reqwest Client per crawl, reused for every page (connection pooling)
// - Configured timeout and User-Agent on every request
// - Non-2xx responses are failures, not pages
// - Failures are categorized so the crawl log says *why* a page was skipped
//
// Exactly one request is in flight at a time: the crawl engine awaits each
// fetch before dequeuing the next URL.
// =============================================================================

use super::{FetchedPage, PageFetcher};
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use url::Url;

// Redirect chains longer than this are treated as failures
const MAX_REDIRECTS: usize = 5;

/// A `PageFetcher` backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Builds a client that sends `user_agent` and gives up after `timeout`.
    ///
    /// A builder failure (e.g. a user agent that is not a valid header
    /// value) is a setup problem, not a page fetch, so it comes back as the
    /// plain `reqwest::Error`.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client, timeout })
    }

    // Maps reqwest's error into our categories
    fn categorize_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout.as_millis())
        } else {
            FetchError::Request(error)
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.categorize_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let html = response
            .text()
            .await
            .map_err(|e| self.categorize_error(e))?;

        Ok(FetchedPage { html, content_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5), "TestBot/1.0").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/docs")
            .match_header("user-agent", "TestBot/1.0")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<title>Docs</title>")
            .expect(1)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/docs", server.url())).unwrap();
        let page = fetcher().fetch(&url).await.unwrap();

        assert_eq!(page.html, "<title>Docs</title>");
        assert_eq!(
            page.content_type.as_deref(),
            Some("text/html; charset=utf-8")
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/missing", server.url())).unwrap();
        let result = fetcher().fetch(&url).await;

        assert!(matches!(result, Err(FetchError::Status(404))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/boom")
            .with_status(500)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/boom", server.url())).unwrap();
        assert!(matches!(
            fetcher().fetch(&url).await,
            Err(FetchError::Status(500))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_fetch_timeout_is_reported() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/slow")
            .with_status(200)
            .with_body_from_request(|_| {
                std::thread::sleep(Duration::from_millis(1500));
                b"<title>Too late</title>".to_vec()
            })
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(Duration::from_millis(200), "TestBot/1.0").unwrap();
        let url = Url::parse(&format!("{}/slow", server.url())).unwrap();
        let result = fetcher.fetch(&url).await;

        assert!(
            matches!(result, Err(FetchError::Timeout(200))),
            "expected a timeout, got {:?}",
            result
        );
    }

    #[test]
    fn test_invalid_user_agent_fails_client_build() {
        let err = HttpFetcher::new(Duration::from_secs(5), "bad\nagent").unwrap_err();
        assert!(err.is_builder());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Port 9 (discard) is not expected to be listening locally
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let result = fetcher().fetch(&url).await;
        assert!(result.is_err());
    }
}
