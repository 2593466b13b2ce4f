use axum::{
    extract::{RawQuery, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::job_ranking::{rank_jobs, RankedJob, RANKING_WINDOW};
use crate::matching::models::{CandidateSkill, MatchResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub job_url: Option<String>,
    /// Takes precedence over `job_url` when non-empty.
    pub skills_override: Option<Vec<String>>,
    pub candidate_skills: Vec<CandidateSkill>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub required_skills: Vec<String>,
    #[serde(flatten)]
    pub result: MatchResult,
}

/// POST /api/v1/match
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let required_skills = match (req.skills_override, req.job_url) {
        (Some(skills), _) if !skills.is_empty() => skills,
        (_, Some(url)) => state.live_skills().extract(&url).await?,
        _ => {
            return Err(AppError::Validation(
                "provide job_url or skills_override".to_string(),
            ))
        }
    };

    let result = state.scorer.score(&required_skills, &req.candidate_skills);
    Ok(Json(MatchResponse {
        required_skills,
        result,
    }))
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub user_skills: Vec<String>,
    pub count: usize,
    pub jobs: Vec<RankedJob>,
}

/// GET /api/v1/recommendations?skills=a&skills=b
pub async fn handle_recommendations(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let user_skills = skills_from_query(query.as_deref().unwrap_or_default());
    if user_skills.is_empty() {
        return Err(AppError::Validation(
            "at least one 'skills' parameter is required".to_string(),
        ));
    }

    let jobs = state.store.list_jobs(RANKING_WINDOW).await?;
    let ranked = rank_jobs(jobs, &user_skills);
    Ok(Json(RecommendationsResponse {
        user_skills,
        count: ranked.len(),
        jobs: ranked,
    }))
}

/// Every non-blank `skills` value, in query order.
fn skills_from_query(query: &str) -> Vec<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(k, _)| k == "skills")
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_skills_params_are_collected() {
        assert_eq!(
            skills_from_query("skills=python&skills=machine%20learning&other=x&skills=+"),
            vec!["python", "machine learning"]
        );
        assert!(skills_from_query("").is_empty());
    }
}
