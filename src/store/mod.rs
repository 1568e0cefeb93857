// src/store/mod.rs
// =============================================================================
// This module persists raw page records.
//
// Submodules:
// - record: The RawCrawlResult JSON record
// - json:   JsonFileStore, one directory per resource, one file per page
//
// Layout on disk:
//   <storage_dir>/raw_data/<resource>/<host>_<path>_<millis>.json
//
// Filenames carry a millisecond timestamp, so crawling the same site twice
// produces a second set of files rather than overwriting the first.
// =============================================================================

mod json;
mod record;

pub use json::{JsonFileStore, ResourceSummary};
pub use record::{PageMetadata, RawCrawlResult};

use crate::error::PersistenceError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use url::Url;

// Longest sanitized host and path fragments kept in a filename.
// Together with the timestamp this keeps names well under the usual
// 255-byte filesystem limit, even for hosts built from 63-byte labels.
const MAX_HOST_FRAGMENT: usize = 50;
const MAX_PATH_FRAGMENT: usize = 50;

/// Durable storage for raw page records, partitioned by resource name.
#[async_trait]
pub trait PageStore {
    /// Writes `record` under `resource` and returns where it ended up.
    async fn save(
        &self,
        resource: &str,
        filename: &str,
        record: &RawCrawlResult,
    ) -> Result<PathBuf, PersistenceError>;
}

/// Builds the record filename for `url` fetched at `at`.
///
/// ```text
/// https://example.com/docs/intro  ->  example.com__docs_intro_1714564800000.json
/// ```
pub fn page_filename(url: &Url, at: DateTime<Utc>) -> String {
    let host: String = url
        .host_str()
        .unwrap_or("unknown")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_HOST_FRAGMENT)
        .collect();

    let path: String = url
        .path()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(MAX_PATH_FRAGMENT)
        .collect();

    format!("{}_{}_{}.json", host, path, at.timestamp_millis())
}
