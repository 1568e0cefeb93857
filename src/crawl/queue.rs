// src/crawl/queue.rs
// =============================================================================
// This module implements the bounded breadth-first crawl.
//
// How it works:
// 1. Start with the seed URL in a queue at depth 0
// 2. Pop the front task; skip it if already visited or too deep
// 3. Mark it visited *before* fetching, so a failing page is never retried
// 4. Fetch, persist the raw record, count the page
// 5. If depth < max_depth, queue the page's same-domain links at depth + 1
// 6. Stop when the queue is empty or max_pages pages have been fetched
//
// Bounds:
// - max_depth: link hops from the seed (0 = only the seed page)
// - max_pages: successfully fetched pages, failures do not count
//
// All traversal state lives in a CrawlSession built fresh for each call to
// crawl(), so two crawls with the same Crawler never share a visited set.
//
// Rust concepts:
// - VecDeque: FIFO queue, push_back + pop_front gives breadth-first order
// - HashSet<Url>: visited set with O(1) lookup
// - Generics with trait bounds: Crawler<F: PageFetcher, S: PageStore> lets
//   tests plug in an in-memory site and store
// - let-else: `let Some(task) = ... else { break };` ends the loop cleanly
// =============================================================================

use super::links::{filter_links, parse_seed_url};
use crate::error::{ConfigError, CrawlError};
use crate::fetch::{parse_page, FetchedPage, PageFetcher};
use crate::store::{page_filename, PageMetadata, PageStore, RawCrawlResult};
use chrono::Utc;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::time::Instant;
use url::Url;

// A page waiting in the crawl queue
#[derive(Debug, Clone, PartialEq, Eq)]
struct CrawlTask {
    url: Url,
    depth: usize, // Link hops from the seed URL
}

/// What a finished crawl reports back to its caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    pub resource: String,
    pub start_url: String,
    /// Pages fetched successfully (never more than max_pages)
    pub pages_crawled: usize,
    /// Unique URLs dequeued, including ones whose fetch failed
    pub urls_visited: usize,
    pub fetch_failures: usize,
    pub persist_failures: usize,
    /// Same-domain links found across all crawled pages
    pub links_discovered: usize,
    /// Where each record was written
    pub saved: Vec<PathBuf>,
    pub duration_ms: u128,
}

// Queue, visited set and counters for exactly one crawl() call
struct CrawlSession {
    seed_host: String,
    max_depth: usize,
    queue: VecDeque<CrawlTask>,
    visited: HashSet<Url>,
    summary: CrawlSummary,
}

impl CrawlSession {
    fn new(resource: &str, seed: Url, max_depth: usize) -> Self {
        // Links are only followed when their host matches this exactly
        let seed_host = seed.host_str().unwrap_or_default().to_string();
        let summary = CrawlSummary {
            resource: resource.to_string(),
            start_url: seed.to_string(),
            ..Default::default()
        };

        // The seed is the only task at depth 0
        let mut queue = VecDeque::new();
        queue.push_back(CrawlTask {
            url: seed,
            depth: 0,
        });

        Self {
            seed_host,
            max_depth,
            queue,
            visited: HashSet::new(),
            summary,
        }
    }

    // Pops tasks until one is worth fetching, and marks it visited
    fn next_task(&mut self) -> Option<CrawlTask> {
        while let Some(task) = self.queue.pop_front() {
            // The same URL can be queued by several pages before it is visited
            if self.visited.contains(&task.url) {
                tracing::debug!("Skipping already visited URL: {}", task.url);
                continue;
            }
            if task.depth > self.max_depth {
                tracing::debug!("Skipping {} beyond max depth {}", task.url, self.max_depth);
                continue;
            }

            // Visited on dequeue: a page whose fetch fails is not tried again
            self.visited.insert(task.url.clone());
            return Some(task);
        }
        None
    }

    // Queues links one hop deeper than `from`, unless already visited
    fn enqueue_links(&mut self, from: &CrawlTask, links: Vec<Url>) {
        // Pages at max_depth are stored but their links are not followed
        if from.depth >= self.max_depth {
            return;
        }

        // Keep link order, so the queue stays breadth-first in page order
        for link in links {
            if !self.visited.contains(&link) {
                self.queue.push_back(CrawlTask {
                    url: link,
                    depth: from.depth + 1,
                });
            }
        }
    }
}

/// Crawls one domain for one resource, page by page.
///
/// The fetcher and store are the only I/O; everything else is in-memory
/// queue work. One fetch is in flight at a time.
pub struct Crawler<F, S> {
    fetcher: F,
    store: S,
    resource: String,
}

impl<F, S> Crawler<F, S>
where
    F: PageFetcher,
    S: PageStore,
{
    pub fn new(fetcher: F, store: S, resource: impl Into<String>) -> Self {
        Self {
            fetcher,
            store,
            resource: resource.into(),
        }
    }

    /// Runs a bounded breadth-first crawl from `start_url`.
    ///
    /// Fails only when the seed URL is invalid or `max_pages` is zero, and
    /// in both cases before anything is fetched. Individual fetch and
    /// storage failures are logged and counted in the summary.
    pub async fn crawl(
        &self,
        start_url: &str,
        max_depth: usize,
        max_pages: usize,
    ) -> Result<CrawlSummary, CrawlError> {
        // Reject bad input before any request goes out
        if max_pages == 0 {
            return Err(ConfigError::Invalid("max pages must be at least 1".to_string()).into());
        }
        let seed = parse_seed_url(start_url)?;
        let started = Instant::now();

        tracing::info!(
            resource = %self.resource,
            max_depth,
            max_pages,
            "Starting crawl at {}",
            seed
        );

        let mut session = CrawlSession::new(&self.resource, seed, max_depth);

        // Main crawl loop: only successful fetches count toward max_pages
        while session.summary.pages_crawled < max_pages {
            let Some(task) = session.next_task() else {
                break;
            };

            tracing::info!("Crawling [depth {}]: {}", task.depth, task.url);

            // A failed fetch (timeout, 404, refused) is logged and skipped
            let page = match self.fetcher.fetch(&task.url).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Failed to fetch {}: {}", task.url, e);
                    session.summary.fetch_failures += 1;
                    continue;
                }
            };
            session.summary.pages_crawled += 1;

            // Store the record, then queue what it links to
            let links = self.process_page(&mut session, &task, page).await;
            session.enqueue_links(&task, links);
        }

        // Move the counters out of the session and finish the report
        let mut summary = session.summary;
        summary.urls_visited = session.visited.len();
        summary.duration_ms = started.elapsed().as_millis();

        tracing::info!(
            pages_crawled = summary.pages_crawled,
            urls_visited = summary.urls_visited,
            fetch_failures = summary.fetch_failures,
            persist_failures = summary.persist_failures,
            "Crawl completed for {}",
            self.resource
        );

        Ok(summary)
    }

    // Builds and stores the raw record; returns the page's crawlable links
    async fn process_page(
        &self,
        session: &mut CrawlSession,
        task: &CrawlTask,
        page: FetchedPage,
    ) -> Vec<Url> {
        // One parse gives both the hrefs and the <title>
        let parsed = parse_page(&page.html);

        // Resolve relative hrefs against this page and keep same-host ones
        let links = filter_links(
            &task.url,
            &session.seed_host,
            parsed.hrefs.iter().map(String::as_str),
        );
        session.summary.links_discovered += links.len();

        // The same timestamp goes into the record and its filename
        let extracted_at = Utc::now();
        let record = RawCrawlResult {
            url: task.url.to_string(),
            html: page.html,
            extracted_at,
            links: links.iter().map(Url::to_string).collect(),
            metadata: PageMetadata {
                title: parsed.title,
                content_type: page.content_type,
            },
        };

        // A failed save is counted but does not stop the crawl
        let filename = page_filename(&task.url, extracted_at);
        match self.store.save(&self.resource, &filename, &record).await {
            Ok(path) => {
                tracing::info!("Saved {} to {}", task.url, path.display());
                session.summary.saved.push(path);
            }
            Err(e) => {
                tracing::warn!("Failed to save {}: {}", task.url, e);
                session.summary.persist_failures += 1;
            }
        }

        links
    }
}
