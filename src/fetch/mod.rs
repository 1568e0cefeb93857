// src/fetch/mod.rs
// =============================================================================
// This module retrieves pages for the crawl engine.
//
// Submodules:
// - http: The reqwest-backed fetcher used by the CLI
// - html: Extracts anchor hrefs and the <title> from fetched HTML
//
// The engine only sees the PageFetcher trait, so tests can swap in an
// in-memory page graph instead of a real server.
// =============================================================================

mod html;
mod http;

pub use html::parse_page;
pub use http::HttpFetcher;

use crate::error::FetchError;
use async_trait::async_trait;
use url::Url;

/// The body and headers of one successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub html: String,
    /// Value of the Content-Type response header, if any
    pub content_type: Option<String>,
}

/// Retrieves a single page. Implementations apply their own timeout and
/// User-Agent; any failure is reported as a `FetchError`.
#[async_trait]
pub trait PageFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}
