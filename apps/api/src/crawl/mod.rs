//! Crawl pipeline: listing pages → posting links → fetch → extract → store.

pub mod allowlist;
mod dom;
pub mod extractor;
pub mod fetcher;
pub mod handlers;
pub mod links;
pub mod live;
pub mod orchestrator;
pub mod rules;

use thiserror::Error;

use crate::crawl::fetcher::FetchError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("host '{0}' is not allowed")]
    HostNotAllowed(String),

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("listing page fetch failed: {0}")]
    ListingFetch(#[source] FetchError),

    #[error("posting fetch failed: {0}")]
    PostingFetch(#[source] FetchError),

    #[error("no skills found at {0}")]
    NothingExtracted(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
