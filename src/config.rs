// src/config.rs
// =============================================================================
// Crawler configuration.
//
// Values are layered, lowest priority first:
//   1. Built-in defaults (CrawlerConfig::default)
//   2. An explicit JSON settings file (--config know-bot.json)
//   3. Environment variables (read by clap, see cli.rs)
//   4. Command-line flags
//
// Layers 3 and 4 arrive together as ConfigOverrides, because clap already
// resolves a flag against its environment variable.
// =============================================================================

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_MAX_PAGES: usize = 50;
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_USER_AGENT: &str = "KnowledgeRetrievalBot/1.0";
pub const DEFAULT_STORAGE_DIR: &str = "knowledge_retrieval";

/// Everything a crawl run needs besides the resource name and seed URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlerConfig {
    /// Maximum link hops from the seed URL
    pub max_depth: usize,
    /// Maximum number of pages fetched successfully
    pub max_pages: usize,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Root directory; records go under <storage_dir>/raw_data/<resource>
    pub storage_dir: PathBuf,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
        }
    }
}

impl CrawlerConfig {
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// Resolves defaults, the optional settings file and `overrides`.
    pub fn load(
        settings_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let mut builder = Self::builder();

        if let Some(path) = settings_path {
            builder = SettingsFile::load(path)?.apply(builder);
        }

        overrides.apply(builder).build()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pages == 0 {
            return Err(ConfigError::Invalid(
                "max pages must be at least 1".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "request timeout must be greater than 0 ms".to_string(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("user agent must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    pub fn request_timeout_ms(mut self, millis: u64) -> Self {
        self.config.request_timeout = Duration::from_millis(millis);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn storage_dir(mut self, storage_dir: impl Into<PathBuf>) -> Self {
        self.config.storage_dir = storage_dir.into();
        self
    }

    /// Validates and returns the configuration
    pub fn build(self) -> Result<CrawlerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// The subset of the know-bot.json settings file the crawler reads.
// Unknown keys (model name, processing mode, ...) are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    max_crawl_depth: Option<usize>,
    max_crawl_pages: Option<usize>,
    request_timeout: Option<u64>,
    user_agent: Option<String>,
    base_storage_path: Option<PathBuf>,
}

impl SettingsFile {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply(self, mut builder: CrawlerConfigBuilder) -> CrawlerConfigBuilder {
        if let Some(v) = self.max_crawl_depth {
            builder = builder.max_depth(v);
        }
        if let Some(v) = self.max_crawl_pages {
            builder = builder.max_pages(v);
        }
        if let Some(v) = self.request_timeout {
            builder = builder.request_timeout_ms(v);
        }
        if let Some(v) = self.user_agent {
            builder = builder.user_agent(v);
        }
        if let Some(v) = self.base_storage_path {
            builder = builder.storage_dir(v);
        }
        builder
    }
}

/// Values from flags or environment variables; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_depth: Option<usize>,
    pub max_pages: Option<usize>,
    pub request_timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
    pub storage_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    fn apply(&self, mut builder: CrawlerConfigBuilder) -> CrawlerConfigBuilder {
        if let Some(v) = self.max_depth {
            builder = builder.max_depth(v);
        }
        if let Some(v) = self.max_pages {
            builder = builder.max_pages(v);
        }
        if let Some(v) = self.request_timeout_ms {
            builder = builder.request_timeout_ms(v);
        }
        if let Some(v) = &self.user_agent {
            builder = builder.user_agent(v.clone());
        }
        if let Some(v) = &self.storage_dir {
            builder = builder.storage_dir(v.clone());
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlerConfig::load(None, &ConfigOverrides::default()).unwrap();
        assert_eq!(config, CrawlerConfig::default());
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.max_pages, 50);
        assert_eq!(config.request_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_builder() {
        let config = CrawlerConfig::builder()
            .max_depth(1)
            .max_pages(7)
            .request_timeout_ms(250)
            .user_agent("Bot/2.0")
            .storage_dir("/tmp/kb")
            .build()
            .unwrap();
        assert_eq!(config.max_depth, 1);
        assert_eq!(config.max_pages, 7);
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.user_agent, "Bot/2.0");
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/kb"));
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        assert!(CrawlerConfig::builder().max_pages(0).build().is_err());
        assert!(CrawlerConfig::builder().request_timeout_ms(0).build().is_err());
        assert!(CrawlerConfig::builder().user_agent("  ").build().is_err());
    }

    #[test]
    fn test_settings_file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("know-bot.json");
        std::fs::write(
            &path,
            r#"{
                "maxCrawlDepth": 1,
                "maxCrawlPages": 20,
                "requestTimeout": 1500,
                "userAgent": "FileBot/1.0",
                "baseStoragePath": "/data/kb",
                "modelName": "llama3.2:3b"
            }"#,
        )
        .unwrap();

        let from_file = CrawlerConfig::load(Some(&path), &ConfigOverrides::default()).unwrap();
        assert_eq!(from_file.max_depth, 1);
        assert_eq!(from_file.max_pages, 20);
        assert_eq!(from_file.request_timeout, Duration::from_millis(1500));
        assert_eq!(from_file.user_agent, "FileBot/1.0");
        assert_eq!(from_file.storage_dir, PathBuf::from("/data/kb"));

        let overrides = ConfigOverrides {
            max_pages: Some(5),
            user_agent: Some("FlagBot/1.0".to_string()),
            ..Default::default()
        };
        let layered = CrawlerConfig::load(Some(&path), &overrides).unwrap();
        assert_eq!(layered.max_depth, 1);
        assert_eq!(layered.max_pages, 5);
        assert_eq!(layered.user_agent, "FlagBot/1.0");
    }

    #[test]
    fn test_partial_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "maxCrawlPages": 9 }"#).unwrap();

        let config = CrawlerConfig::load(Some(&path), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.max_pages, 9);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_missing_settings_file() {
        let result = CrawlerConfig::load(
            Some(Path::new("/definitely/not/here.json")),
            &ConfigOverrides::default(),
        );
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_malformed_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = CrawlerConfig::load(Some(&path), &ConfigOverrides::default());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
