//! Job persistence behind a trait so the crawl pipeline runs the same against
//! Postgres and the in-memory store used by tests.

pub mod categories;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::job::{JobRecord, StoredJob};

pub use memory::MemoryJobStore;
pub use postgres::PgJobStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Carried in `AppState` as `Arc<dyn JobStore>`.
///
/// Every method is one unit of work: nothing is held between calls, so no
/// connection outlives a single operation or spans a network fetch.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Removes every job, category and association.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Idempotent upsert keyed by URL; returns the job id (existing or new).
    /// With `with_categories`, the breadcrumb is decomposed into the category
    /// forest and the job linked to every node of its chain.
    async fn save_job(&self, job: &JobRecord, with_categories: bool) -> Result<i64, StoreError>;

    async fn count_jobs(&self) -> Result<i64, StoreError>;

    /// Most recently fetched first, each with its category chain parent → child.
    async fn list_jobs(&self, limit: i64) -> Result<Vec<StoredJob>, StoreError>;
}
