// src/crawl/mod.rs
// =============================================================================
// This module is the crawl engine.
//
// Features:
// - Breadth-first crawling from a single seed URL
// - Same-domain restriction (exact hostname match, no subdomains)
// - Depth and page-count limits
// - One fetch in flight at a time; a failing page never stops the run
//
// Submodules:
// - links: URL normalization, validation and domain filtering
// - queue: The traversal itself (Crawler, CrawlSummary)
// =============================================================================

mod links;
mod queue;

pub use queue::{CrawlSummary, Crawler};
