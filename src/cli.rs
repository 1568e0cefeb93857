// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes. Crawl limits can also come from environment
// variables (clap's `env` feature), which is how the settings layering in
// config.rs gets its "env" layer.
// =============================================================================

use crate::config::ConfigOverrides;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "know-crawl",
    version,
    about = "Crawl a documentation site into a local store of raw JSON page records",
    long_about = "know-crawl walks a single domain breadth-first from one start URL, \
                  saving every fetched page as a JSON record grouped by resource name. \
                  Set RUST_LOG=debug to see why individual links were skipped."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a site and store one raw JSON record per page
    ///
    /// Example: know-crawl crawl tokio-docs https://tokio.rs/tokio/tutorial --max-depth 2
    Crawl {
        /// Name used to group this crawl's records in storage
        resource_name: String,

        /// Start URL; https:// is assumed when no scheme is given
        start_url: String,

        #[command(flatten)]
        limits: CrawlArgs,

        #[command(flatten)]
        storage: StorageArgs,

        /// Print the summary as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List stored resources, or the records of one resource
    ///
    /// Example: know-crawl resources tokio-docs
    Resources {
        /// Show the records of this resource instead of all resources
        resource_name: Option<String>,

        #[command(flatten)]
        storage: StorageArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Traversal limits and request settings
#[derive(Args, Debug, Default)]
pub struct CrawlArgs {
    /// Maximum link hops from the start URL (0 = only the start page)
    #[arg(short = 'd', long, env = "MAX_CRAWL_DEPTH")]
    pub max_depth: Option<usize>,

    /// Maximum number of pages to fetch
    #[arg(short = 'm', long, env = "MAX_CRAWL_PAGES")]
    pub max_pages: Option<usize>,

    /// Per-request timeout in milliseconds
    #[arg(long = "timeout-ms", env = "REQUEST_TIMEOUT")]
    pub timeout_ms: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long, env = "CRAWL_USER_AGENT")]
    pub user_agent: Option<String>,
}

/// Where settings and records live
#[derive(Args, Debug, Default)]
pub struct StorageArgs {
    /// Storage root; records go under <DIR>/raw_data/<resource>
    #[arg(long, value_name = "DIR", env = "KNOW_CRAWL_STORAGE")]
    pub storage: Option<PathBuf>,

    /// JSON settings file (e.g. know-bot.json)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Commands {
    /// Flags and env values that override the settings file
    pub fn overrides(&self) -> ConfigOverrides {
        match self {
            Commands::Crawl {
                limits, storage, ..
            } => ConfigOverrides {
                max_depth: limits.max_depth,
                max_pages: limits.max_pages,
                request_timeout_ms: limits.timeout_ms,
                user_agent: limits.user_agent.clone(),
                storage_dir: storage.storage.clone(),
            },
            Commands::Resources { storage, .. } => ConfigOverrides {
                storage_dir: storage.storage.clone(),
                ..Default::default()
            },
        }
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        match self {
            Commands::Crawl { storage, .. } | Commands::Resources { storage, .. } => {
                storage.config.as_ref()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_crawl() {
        let cli = Cli::try_parse_from([
            "know-crawl",
            "crawl",
            "docs",
            "example.com/docs",
            "--max-depth",
            "2",
            "-m",
            "10",
            "--timeout-ms",
            "800",
            "--storage",
            "/tmp/kb",
            "--json",
        ])
        .unwrap();

        let overrides = cli.command.overrides();
        assert_eq!(overrides.max_depth, Some(2));
        assert_eq!(overrides.max_pages, Some(10));
        assert_eq!(overrides.request_timeout_ms, Some(800));
        assert_eq!(overrides.storage_dir, Some(PathBuf::from("/tmp/kb")));

        match cli.command {
            Commands::Crawl {
                resource_name,
                start_url,
                json,
                ..
            } => {
                assert_eq!(resource_name, "docs");
                assert_eq!(start_url, "example.com/docs");
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_resources() {
        let cli = Cli::try_parse_from(["know-crawl", "resources", "--config", "kb.json"]).unwrap();
        assert_eq!(cli.command.config_path(), Some(&PathBuf::from("kb.json")));
        assert!(matches!(
            cli.command,
            Commands::Resources {
                resource_name: None,
                ..
            }
        ));
    }

    #[test]
    fn test_crawl_requires_url() {
        assert!(Cli::try_parse_from(["know-crawl", "crawl", "docs"]).is_err());
    }
}
