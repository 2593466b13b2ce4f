use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use crate::models::job::{JobRecord, JobRow, StoredJob};
use crate::store::categories::{link_category_chain, CategoryForest};
use crate::store::{JobStore, StoreError};

/// Postgres-backed store. Each operation runs inside its own transaction,
/// committed on success and rolled back when dropped on any error path.
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn clear(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("TRUNCATE job_categories, jobs, categories RESTART IDENTITY")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn save_job(&self, job: &JobRecord, with_categories: bool) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let inserted: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO jobs (title, category, min_education, location, work_type, skills, url, fetched_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (url) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&job.title)
        .bind(&job.category)
        .bind(&job.min_education)
        .bind(&job.location)
        .bind(&job.work_type)
        .bind(Json(job.skills.clone()))
        .bind(&job.url)
        .bind(job.fetched_at)
        .fetch_optional(&mut *tx)
        .await?;

        let job_id = match inserted {
            Some(id) => id,
            None => {
                debug!(url = %job.url, "job already stored");
                sqlx::query_scalar("SELECT id FROM jobs WHERE url = $1")
                    .bind(&job.url)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        if with_categories {
            let mut forest = PgCategoryForest { tx: &mut tx };
            link_category_chain(&mut forest, job_id, &job.category).await?;
        }

        tx.commit().await?;
        Ok(job_id)
    }

    async fn count_jobs(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_jobs(&self, limit: i64) -> Result<Vec<StoredJob>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let rows: Vec<JobRow> = sqlx::query_as(
            r#"
            SELECT id, title, category, min_education, location, work_type, skills, url, fetched_at
            FROM jobs
            ORDER BY fetched_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *tx)
        .await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let links: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT jc.job_id, c.name
            FROM job_categories jc
            JOIN categories c ON c.id = jc.category_id
            WHERE jc.job_id = ANY($1)
            ORDER BY jc.job_id, jc.position
            "#,
        )
        .bind(ids.as_slice())
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut chains: HashMap<i64, Vec<String>> = HashMap::new();
        for (job_id, name) in links {
            chains.entry(job_id).or_default().push(name);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let categories = chains.remove(&row.id).unwrap_or_default();
                StoredJob::from_row(row, categories)
            })
            .collect())
    }
}

/// Category forest operations bound to the caller's transaction.
struct PgCategoryForest<'t> {
    tx: &'t mut Transaction<'static, Postgres>,
}

#[async_trait]
impl CategoryForest for PgCategoryForest<'_> {
    async fn find_or_create(&mut self, name: &str, parent: Option<i64>) -> Result<i64, StoreError> {
        // Sibling uniqueness lives in a unique index on (name, COALESCE(parent_id, 0)).
        let inserted: Option<i64> = sqlx::query_scalar(
            "INSERT INTO categories (name, parent_id) VALUES ($1, $2) ON CONFLICT DO NOTHING RETURNING id",
        )
        .bind(name)
        .bind(parent)
        .fetch_optional(&mut **self.tx)
        .await?;

        if let Some(id) = inserted {
            return Ok(id);
        }

        let id = sqlx::query_scalar(
            "SELECT id FROM categories WHERE name = $1 AND parent_id IS NOT DISTINCT FROM $2",
        )
        .bind(name)
        .bind(parent)
        .fetch_one(&mut **self.tx)
        .await?;
        Ok(id)
    }

    async fn link_job(&mut self, job_id: i64, category_id: i64, position: i32) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO job_categories (job_id, category_id, position)
            VALUES ($1, $2, $3)
            ON CONFLICT (job_id, category_id) DO NOTHING
            "#,
        )
        .bind(job_id)
        .bind(category_id)
        .bind(position)
        .execute(&mut **self.tx)
        .await?;
        Ok(())
    }
}
