//! In-memory job store for tests and local runs without Postgres.
//! Same contract as `PgJobStore`; data is lost on restart.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::job::{CategoryRow, JobRecord, StoredJob};
use crate::store::categories::{link_category_chain, CategoryForest};
use crate::store::{JobStore, StoreError};

#[derive(Default)]
pub struct MemoryJobStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    jobs: Vec<(i64, JobRecord)>,
    categories: Vec<CategoryRow>,
    /// (job_id, category_id, position)
    links: Vec<(i64, i64, i32)>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn category_count(&self) -> usize {
        self.state.lock().await.categories.len()
    }
}

#[async_trait]
impl CategoryForest for MemoryState {
    async fn find_or_create(&mut self, name: &str, parent: Option<i64>) -> Result<i64, StoreError> {
        if let Some(existing) = self
            .categories
            .iter()
            .find(|c| c.name == name && c.parent_id == parent)
        {
            return Ok(existing.id);
        }
        let id = self.categories.len() as i64 + 1;
        self.categories.push(CategoryRow {
            id,
            name: name.to_string(),
            parent_id: parent,
        });
        Ok(id)
    }

    async fn link_job(&mut self, job_id: i64, category_id: i64, position: i32) -> Result<(), StoreError> {
        if !self
            .links
            .iter()
            .any(|&(j, c, _)| j == job_id && c == category_id)
        {
            self.links.push((job_id, category_id, position));
        }
        Ok(())
    }
}

impl MemoryState {
    fn chain_for(&self, job_id: i64) -> Vec<String> {
        let mut links: Vec<&(i64, i64, i32)> =
            self.links.iter().filter(|(j, _, _)| *j == job_id).collect();
        links.sort_by_key(|(_, _, position)| *position);
        links
            .into_iter()
            .filter_map(|(_, category_id, _)| {
                self.categories
                    .iter()
                    .find(|c| c.id == *category_id)
                    .map(|c| c.name.clone())
            })
            .collect()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn clear(&self) -> Result<(), StoreError> {
        *self.state.lock().await = MemoryState::default();
        Ok(())
    }

    async fn save_job(&self, job: &JobRecord, with_categories: bool) -> Result<i64, StoreError> {
        let mut state = self.state.lock().await;

        let existing = state
            .jobs
            .iter()
            .find(|(_, stored)| stored.url == job.url)
            .map(|(id, _)| *id);
        let job_id = match existing {
            Some(id) => id,
            None => {
                let id = state.jobs.len() as i64 + 1;
                state.jobs.push((id, job.clone()));
                id
            }
        };

        if with_categories {
            link_category_chain(&mut *state, job_id, &job.category).await?;
        }
        Ok(job_id)
    }

    async fn count_jobs(&self) -> Result<i64, StoreError> {
        Ok(self.state.lock().await.jobs.len() as i64)
    }

    async fn list_jobs(&self, limit: i64) -> Result<Vec<StoredJob>, StoreError> {
        let state = self.state.lock().await;

        let mut jobs: Vec<&(i64, JobRecord)> = state.jobs.iter().collect();
        jobs.sort_by(|(a_id, a), (b_id, b)| {
            b.fetched_at.cmp(&a.fetched_at).then_with(|| b_id.cmp(a_id))
        });

        Ok(jobs
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|(id, job)| StoredJob {
                id: *id,
                title: job.title.clone(),
                category: job.category.clone(),
                min_education: job.min_education.clone(),
                location: job.location.clone(),
                work_type: job.work_type.clone(),
                skills: job.skills.clone(),
                url: job.url.clone(),
                fetched_at: job.fetched_at,
                categories: state.chain_for(*id),
            })
            .collect())
    }
}
