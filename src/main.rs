// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, filtered by RUST_LOG, written to stderr)
// 2. Parse command-line arguments using clap
// 3. Resolve the crawler configuration (defaults < file < env < flags)
// 4. Dispatch to the appropriate subcommand handler
// 5. Exit with proper code (0 = pages saved, 1 = nothing saved, 2 = error)
//
// Rust concepts used:
// - async/await: page fetches and file writes run on the tokio runtime
// - anyhow::Context: wraps lower-level errors with what we were doing
// - match on enum variants: each subcommand (and its options) gets a branch
// =============================================================================

// Module declarations - one per concern, see each file's header
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - settings layering
mod crawl; // src/crawl/ - the breadth-first crawl engine
mod error; // src/error.rs - typed errors for each layer
mod fetch; // src/fetch/ - HTTP fetching and HTML parsing
mod store; // src/store/ - raw JSON records on disk

use anyhow::{Context, Result};
use clap::Parser; // Parser trait enables Cli::parse()
use cli::{Cli, Commands};
use config::CrawlerConfig;
use crawl::{CrawlSummary, Crawler};
use fetch::HttpFetcher;
use serde::Serialize;
use std::path::{Path, PathBuf};
use store::{JsonFileStore, ResourceSummary};
use tracing_subscriber::EnvFilter;

// #[tokio::main] builds the runtime and blocks on our async main
#[tokio::main]
async fn main() {
    init_logging();

    // Run the application and turn its outcome into a process exit code
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            tracing::error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so --json output on stdout stays machine-readable.
// RUST_LOG overrides the default "info" level (e.g. RUST_LOG=debug).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// Returns:
//   Ok(0) = success
//   Ok(1) = crawl finished but no page could be saved
//   Err   = fatal error (bad settings, invalid start URL)
async fn run() -> Result<i32> {
    // Parse arguments; clap handles --help, --version and env fallbacks
    let cli = Cli::parse();

    // Settings file first, then env vars and flags on top
    let config = CrawlerConfig::load(
        cli.command.config_path().map(PathBuf::as_path),
        &cli.command.overrides(),
    )
    .context("failed to load settings")?;

    // A named resource lists its pages, no name lists all resources
    match cli.command {
        Commands::Crawl {
            resource_name,
            start_url,
            json,
            ..
        } => handle_crawl(&config, &resource_name, &start_url, json).await,
        Commands::Resources {
            resource_name: Some(name),
            json,
            ..
        } => handle_resource_pages(&config, &name, json).await,
        Commands::Resources {
            resource_name: None,
            json,
            ..
        } => handle_resources(&config, json).await,
    }
}

// Handles the 'crawl' subcommand
// Parameters:
//   resource_name: storage group for the records (e.g. "tokio-docs")
//   start_url: seed URL, https:// is added when no scheme is given
//   json: whether to print the summary as JSON
async fn handle_crawl(
    config: &CrawlerConfig,
    resource_name: &str,
    start_url: &str,
    json: bool,
) -> Result<i32> {
    tracing::info!(
        max_depth = config.max_depth,
        max_pages = config.max_pages,
        timeout_ms = config.request_timeout.as_millis() as u64,
        storage = %config.storage_dir.display(),
        "Crawling {} for resource {:?}",
        start_url,
        resource_name
    );

    // Wire the real fetcher and file store into the engine
    let fetcher = HttpFetcher::new(config.request_timeout, &config.user_agent)
        .context("failed to build HTTP client")?;
    let store = JsonFileStore::new(&config.storage_dir);
    let crawler = Crawler::new(fetcher, store, resource_name);

    // Only a bad seed URL or bad limits make this fail; page errors are counted
    let summary = crawler
        .crawl(start_url, config.max_depth, config.max_pages)
        .await
        .with_context(|| format!("crawl of {} failed", start_url))?;

    if json {
        print_json(&summary)?;
    } else {
        print_crawl_summary(&summary);
    }

    if summary.saved.is_empty() {
        Ok(1) // Exit code 1 = crawl ran but stored nothing
    } else {
        Ok(0)
    }
}

// Handles 'resources' without a name: one line per resource
async fn handle_resources(config: &CrawlerConfig, json: bool) -> Result<i32> {
    let store = JsonFileStore::new(&config.storage_dir);
    let resources = store
        .list_resources()
        .await
        .context("failed to list resources")?;

    if json {
        print_json(&resources)?;
    } else {
        print_resource_table(store.root(), &resources);
    }
    Ok(0)
}

// One stored page as shown by 'resources <name>'
#[derive(Debug, Serialize)]
struct PageListing {
    url: String,
    title: Option<String>,
    extracted_at: String,
    links: usize,
    path: PathBuf,
}

// Handles 'resources <name>': one line per stored page
async fn handle_resource_pages(config: &CrawlerConfig, resource: &str, json: bool) -> Result<i32> {
    let store = JsonFileStore::new(&config.storage_dir);
    let paths = store
        .list_pages(resource)
        .await
        .with_context(|| format!("failed to list pages of {:?}", resource))?;

    // Load each record for its URL and title; a corrupt file is skipped,
    // not fatal, so one bad record does not hide the rest
    let mut pages = Vec::with_capacity(paths.len());
    for path in paths {
        match store.load(&path).await {
            Ok(record) => pages.push(PageListing {
                url: record.url,
                title: record.metadata.title,
                extracted_at: record.extracted_at.to_rfc3339(),
                links: record.links.len(),
                path,
            }),
            Err(e) => tracing::warn!("Skipping unreadable record: {}", e),
        }
    }

    if json {
        print_json(&pages)?;
    } else {
        print_page_table(resource, &pages);
    }
    Ok(0)
}

// Pretty-prints anything serializable to stdout
// ?Sized lets callers pass slices like &[PageListing] directly
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json_output = serde_json::to_string_pretty(value)?;
    println!("{}", json_output);
    Ok(())
}

// Human-readable report of one crawl run
fn print_crawl_summary(summary: &CrawlSummary) {
    println!();
    println!("📊 Crawl summary for {}:", summary.resource);
    println!("   🌐 Start URL: {}", summary.start_url);
    println!("   ✅ Pages crawled: {}", summary.pages_crawled);
    println!("   🔗 Unique URLs visited: {}", summary.urls_visited);
    println!("   🧭 Same-domain links found: {}", summary.links_discovered);
    println!("   ❌ Fetch failures: {}", summary.fetch_failures);
    println!("   💾 Save failures: {}", summary.persist_failures);
    println!("   ⏱️  Duration: {:.2}s", summary.duration_ms as f64 / 1000.0);
}

// Prints resources in a table format
fn print_resource_table(root: &Path, resources: &[ResourceSummary]) {
    if resources.is_empty() {
        println!("No resources found under {}.", root.display());
        return;
    }

    println!("{:<30} {:<8} {}", "RESOURCE", "FILES", "PATH");
    println!("{}", "=".repeat(80));
    for resource in resources {
        println!(
            "{:<30} {:<8} {}",
            resource.name,
            resource.file_count,
            resource.path.display()
        );
    }
}

fn print_page_table(resource: &str, pages: &[PageListing]) {
    if pages.is_empty() {
        println!("No pages stored for {}.", resource);
        return;
    }

    // Header row, then one row per page with long values shortened
    println!("{:<60} {:<30} {:<6}", "URL", "TITLE", "LINKS");
    println!("{}", "=".repeat(98));
    for page in pages {
        println!(
            "{:<60} {:<30} {:<6}",
            truncate(&page.url, 57),
            truncate(page.title.as_deref().unwrap_or(""), 27),
            page.links
        );
    }
    println!();
    println!("📋 Total: {}", pages.len());
}

// Shortens text for table display, respecting char boundaries
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
