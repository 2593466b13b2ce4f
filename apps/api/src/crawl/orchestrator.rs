//! Crawl Orchestrator: the pagination state machine.
//!
//! ```text
//! AwaitingPage ─► FetchingLinks ─► DispatchingJobs ─► AwaitingNextPage ─► AwaitingPage …
//!      │                │                                    │
//!      └────────────────┴──────────────► Done ◄──────────────┘
//! ```
//!
//! One listing page is handled per cycle. Its postings are dispatched either
//! one by one with a fixed delay or through a bounded pool; either way the
//! whole batch finishes before the next page is considered.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use scraper::Html;
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};
use url::Url;
use uuid::Uuid;

use crate::crawl::allowlist::HostAllowlist;
use crate::crawl::extractor::extract_record;
use crate::crawl::fetcher::PageFetcher;
use crate::crawl::links::{discover_links, next_page_url};
use crate::crawl::rules::{ExtractionRules, ListingRule};
use crate::crawl::CrawlError;
use crate::store::JobStore;

// ────────────────────────────────────────────────────────────────────────────
// Run parameters and result
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStrategy {
    /// One posting at a time, sleeping `delay` between fetches.
    Sequential { delay: Duration },
    /// Up to `width` postings in flight at once.
    Pooled { width: usize },
}

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub start_url: String,
    pub max_jobs: usize,
    pub strategy: DispatchStrategy,
    /// Decompose each posting's breadcrumb into the category forest.
    pub with_categories: bool,
    /// Clear the store before the first fetch.
    pub reset_store: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub run_id: Uuid,
    /// Postings saved during this run.
    pub saved: usize,
    /// Jobs in the store after the run.
    pub db_count: i64,
}

// ────────────────────────────────────────────────────────────────────────────
// Visited set
// ────────────────────────────────────────────────────────────────────────────

/// Posting URLs already dispatched, shared by every crawl for the lifetime of
/// the process. Concurrent inserts of the same URL are harmless.
#[derive(Debug, Default)]
pub struct VisitedUrls {
    urls: Mutex<HashSet<String>>,
}

impl VisitedUrls {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // A panic while holding the lock cannot leave a HashSet half-inserted.
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `urls` minus everything already visited, order kept.
    pub fn filter_new(&self, urls: Vec<String>) -> Vec<String> {
        let visited = self.lock();
        urls.into_iter().filter(|u| !visited.contains(u)).collect()
    }

    pub fn mark_all(&self, urls: &[String]) {
        self.lock().extend(urls.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// State machine
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum CrawlState {
    AwaitingPage(Url),
    FetchingLinks(Url),
    DispatchingJobs { batch: Vec<String>, next: Option<Url> },
    AwaitingNextPage { next: Option<Url> },
    Done,
}

pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn JobStore>,
    rules: Arc<ExtractionRules>,
    visited: Arc<VisitedUrls>,
    allowlist: HostAllowlist,
}

impl Crawler {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn JobStore>,
        rules: Arc<ExtractionRules>,
        visited: Arc<VisitedUrls>,
        allowlist: HostAllowlist,
    ) -> Self {
        Self {
            fetcher,
            store,
            rules,
            visited,
            allowlist,
        }
    }

    /// Runs one crawl to completion.
    ///
    /// The start URL is checked against the allowlist before anything else,
    /// including the store reset. A failed listing fetch aborts the run; a
    /// failed posting is logged and skipped.
    pub async fn run(&self, options: CrawlOptions) -> Result<CrawlReport, CrawlError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("crawl", %run_id);
        self.run_inner(run_id, &options).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid, options: &CrawlOptions) -> Result<CrawlReport, CrawlError> {
        let start = self.allowlist.check(&options.start_url)?;

        if options.reset_store {
            self.store.clear().await?;
            info!("store cleared");
        }

        info!(start = %start, max_jobs = options.max_jobs, strategy = ?options.strategy, "crawl started");

        let collected = AtomicUsize::new(0);
        let mut pages_seen: HashSet<Url> = HashSet::new();
        let mut state = CrawlState::AwaitingPage(start);

        loop {
            state = match state {
                CrawlState::AwaitingPage(page) => {
                    if collected.load(Ordering::SeqCst) >= options.max_jobs {
                        info!("job limit reached");
                        CrawlState::Done
                    } else if !pages_seen.insert(page.clone()) {
                        warn!(page = %page, "listing page already visited in this run");
                        CrawlState::Done
                    } else {
                        CrawlState::FetchingLinks(page)
                    }
                }

                CrawlState::FetchingLinks(page) => {
                    info!(page = %page, "fetching listing page");
                    let html = self
                        .fetcher
                        .fetch(page.as_str())
                        .await
                        .map_err(CrawlError::ListingFetch)?;
                    let (links, next) = parse_listing(&html, &page, &self.rules.listing);

                    if links.is_empty() {
                        info!(page = %page, "no postings on listing page");
                        CrawlState::Done
                    } else {
                        let remaining =
                            options.max_jobs.saturating_sub(collected.load(Ordering::SeqCst));
                        let batch: Vec<String> = self
                            .visited
                            .filter_new(links)
                            .into_iter()
                            .filter(|url| self.allowlist.check(url).is_ok())
                            .take(remaining)
                            .collect();
                        CrawlState::DispatchingJobs { batch, next }
                    }
                }

                CrawlState::DispatchingJobs { batch, next } => {
                    info!(batch = batch.len(), "dispatching postings");
                    self.dispatch(&batch, options, &collected).await;
                    // known-bad links are marked too so they are not refetched
                    self.visited.mark_all(&batch);
                    CrawlState::AwaitingNextPage { next }
                }

                CrawlState::AwaitingNextPage { next } => match next {
                    Some(url) if self.allowlist.check(url.as_str()).is_ok() => {
                        CrawlState::AwaitingPage(url)
                    }
                    Some(url) => {
                        warn!(next = %url, "next page is off the allowlist");
                        CrawlState::Done
                    }
                    None => {
                        info!("no further listing pages");
                        CrawlState::Done
                    }
                },

                CrawlState::Done => break,
            };
        }

        let saved = collected.load(Ordering::SeqCst);
        let db_count = self.store.count_jobs().await?;
        info!(saved, db_count, visited = self.visited.len(), "crawl finished");

        Ok(CrawlReport {
            run_id,
            saved,
            db_count,
        })
    }

    async fn dispatch(&self, batch: &[String], options: &CrawlOptions, collected: &AtomicUsize) {
        match options.strategy {
            DispatchStrategy::Sequential { delay } => {
                for (i, url) in batch.iter().enumerate() {
                    if i > 0 {
                        tokio::time::sleep(delay).await;
                    }
                    self.process_job(url, options.with_categories, collected).await;
                }
            }
            DispatchStrategy::Pooled { width } => {
                // built up front: a closure over `&String` makes the stream non-Send
                let jobs: Vec<_> = batch
                    .iter()
                    .map(|url| self.process_job(url, options.with_categories, collected))
                    .collect();
                stream::iter(jobs)
                    .buffer_unordered(width.max(1))
                    .collect::<Vec<()>>()
                    .await;
            }
        }
    }

    async fn process_job(&self, url: &str, with_categories: bool, collected: &AtomicUsize) {
        match self.fetch_and_save(url, with_categories).await {
            Ok(job_id) => {
                let n = collected.fetch_add(1, Ordering::SeqCst) + 1;
                info!(url, job_id, collected = n, "saved job");
            }
            Err(e) => warn!(url, error = %e, "skipping posting"),
        }
    }

    async fn fetch_and_save(&self, url: &str, with_categories: bool) -> Result<i64, CrawlError> {
        let html = self
            .fetcher
            .fetch(url)
            .await
            .map_err(CrawlError::PostingFetch)?;
        let record = extract_record(&html, url, &self.rules);
        Ok(self.store.save_job(&record, with_categories).await?)
    }
}

/// Posting links and the next page in one parse. `Html` is not `Send`, so it
/// stays inside this synchronous call.
fn parse_listing(html: &str, page: &Url, rule: &ListingRule) -> (Vec<String>, Option<Url>) {
    let document = Html::parse_document(html);
    (
        discover_links(&document, page, rule),
        next_page_url(page, &document, rule),
    )
}
