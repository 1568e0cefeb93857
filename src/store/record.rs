// src/store/record.rs
// =============================================================================
// The raw page record: one per successfully fetched page.
//
// On disk it is a JSON object with camelCase keys:
//
//   {
//     "url": "https://example.com/docs",
//     "html": "<!doctype html>...",
//     "extractedAt": "2024-05-01T12:00:00.123Z",
//     "links": ["https://example.com/docs/install", ...],
//     "metadata": { "title": "Docs", "contentType": "text/html" }
//   }
//
// `links` holds only same-domain absolute URLs, in the order their anchors
// appear in the page.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCrawlResult {
    /// The fetched URL
    pub url: String,
    /// Full response body
    pub html: String,
    /// When the page was fetched
    pub extracted_at: DateTime<Utc>,
    /// Same-domain links found on the page, in DOM order
    pub links: Vec<String>,
    pub metadata: PageMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}
