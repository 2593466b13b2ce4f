use std::time::Duration;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::crawl::orchestrator::{CrawlOptions, CrawlReport, DispatchStrategy};
use crate::errors::AppError;
use crate::models::job::StoredJob;
use crate::state::AppState;

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlMode {
    #[default]
    Pooled,
    Sequential,
}

#[derive(Debug, Deserialize)]
pub struct CrawlRequest {
    pub start_url: String,
    #[serde(default = "default_max_jobs")]
    pub max_jobs: usize,
    #[serde(default)]
    pub mode: CrawlMode,
    /// Sequential mode only; falls back to `CRAWL_DELAY_MS`.
    pub delay_ms: Option<u64>,
    /// Pooled mode only; falls back to `CRAWL_CONCURRENCY`.
    pub concurrency: Option<usize>,
    #[serde(default = "default_true")]
    pub with_categories: bool,
}

fn default_max_jobs() -> usize {
    30
}

fn default_true() -> bool {
    true
}

/// POST /api/v1/crawl
/// Clears the store and runs one crawl from `start_url`.
pub async fn handle_crawl(
    State(state): State<AppState>,
    Json(req): Json<CrawlRequest>,
) -> Result<Json<CrawlReport>, AppError> {
    let strategy = match req.mode {
        CrawlMode::Pooled => DispatchStrategy::Pooled {
            width: req.concurrency.unwrap_or(state.config.crawl_concurrency).max(1),
        },
        CrawlMode::Sequential => DispatchStrategy::Sequential {
            delay: Duration::from_millis(req.delay_ms.unwrap_or(state.config.crawl_delay_ms)),
        },
    };

    let report = state
        .crawler()
        .run(CrawlOptions {
            start_url: req.start_url,
            max_jobs: req.max_jobs,
            strategy,
            with_categories: req.with_categories,
            reset_store: true,
        })
        .await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListJobsResponse {
    pub count: usize,
    pub jobs: Vec<StoredJob>,
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<ListJobsQuery>,
) -> Result<Json<ListJobsResponse>, AppError> {
    let limit = params.limit.unwrap_or(100);
    if limit <= 0 {
        return Err(AppError::Validation("limit must be positive".to_string()));
    }
    let jobs = state.store.list_jobs(limit).await?;
    Ok(Json(ListJobsResponse {
        count: jobs.len(),
        jobs,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ExtractSkillsQuery {
    pub job_url: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractSkillsResponse {
    pub job_url: String,
    pub skills: Vec<String>,
}

/// GET /api/v1/jobs/extract-skills
pub async fn handle_extract_skills(
    State(state): State<AppState>,
    Query(params): Query<ExtractSkillsQuery>,
) -> Result<Json<ExtractSkillsResponse>, AppError> {
    let skills = state.live_skills().extract(&params.job_url).await?;
    Ok(Json(ExtractSkillsResponse {
        job_url: params.job_url,
        skills,
    }))
}
