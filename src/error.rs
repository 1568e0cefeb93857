// src/error.rs
// =============================================================================
// Error types shared by the crawl engine and its collaborators.
//
// Each layer gets its own enum so callers can tell recoverable failures
// (a single page that would not fetch, a malformed href) from fatal ones
// (an invalid seed URL, an unreadable settings file).
//
// - FetchError:       one page could not be retrieved; the crawl moves on
// - PersistenceError: one record could not be written; logged and counted
// - LinkParseError:   one href could not become a crawlable URL; dropped
// - ConfigError:      settings could not be loaded or are out of range
// - CrawlError:       what crawl() itself can return to its caller
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Failure to retrieve a single page
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request exceeded the configured timeout
    #[error("request timed out after {0} ms")]
    Timeout(u128),

    /// The server answered with a non-success status
    #[error("HTTP {0}")]
    Status(u16),

    /// Any other transport failure (DNS, connection reset, TLS, ...)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Failure to write or read a raw page record
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error on {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid resource name: {0:?}")]
    InvalidResource(String),
}

/// Why a discovered href was not turned into a traversal candidate
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkParseError {
    #[error("empty href")]
    Empty,

    #[error("could not resolve {href:?}: {reason}")]
    Unresolvable { href: String, reason: String },

    #[error("unsupported scheme {0:?}")]
    UnsupportedScheme(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// Settings could not be loaded or failed validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Errors returned by `Crawler::crawl`
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The seed URL failed normalization or validation; nothing was fetched
    #[error("invalid seed URL {url:?}: {reason}")]
    InvalidSeedUrl { url: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_messages() {
        assert_eq!(FetchError::Status(404).to_string(), "HTTP 404");
        assert_eq!(
            FetchError::Timeout(5000).to_string(),
            "request timed out after 5000 ms"
        );
    }

    #[test]
    fn test_invalid_seed_message_names_url() {
        let err = CrawlError::InvalidSeedUrl {
            url: "   ".to_string(),
            reason: "empty URL".to_string(),
        };
        assert!(err.to_string().contains("empty URL"));
    }
}
