pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::crawl::handlers as crawl;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Crawl and stored jobs
        .route("/api/v1/crawl", post(crawl::handle_crawl))
        .route("/api/v1/jobs", get(crawl::handle_list_jobs))
        .route(
            "/api/v1/jobs/extract-skills",
            get(crawl::handle_extract_skills),
        )
        // Matching
        .route("/api/v1/match", post(matching::handle_match))
        .route(
            "/api/v1/recommendations",
            get(matching::handle_recommendations),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::crawl::fetcher::testing::StaticFetcher;
    use crate::models::job::JobRecord;
    use crate::state::testing::test_state;
    use crate::store::{JobStore, MemoryJobStore};

    const LISTING: &str = r#"<a class="c-jobListView__titleLink" href="/jobs/1">one</a>
        <a class="c-jobListView__titleLink" href="/jobs/2">two</a>"#;
    const POSTING: &str = r#"<h1 class="c-jobView__title">Backend</h1>
        <div class="c-jobView__breadcrumb"><a>IT</a><a>Backend</a></div>
        <li class="c-infoBox__item"><h4 class="c-infoBox__itemTitle">مهارت‌ها</h4>
        <div class="tags"><span>Python</span><span>Django</span></div></li>"#;

    fn site() -> Arc<StaticFetcher> {
        Arc::new(
            StaticFetcher::default()
                .with_page("https://jobinja.ir/jobs?page=1", LISTING)
                .with_page("https://jobinja.ir/jobs?page=2", "<p>end</p>")
                .with_page("https://jobinja.ir/jobs/1", POSTING)
                .with_page("https://jobinja.ir/jobs/2", POSTING)
                .with_page("https://jobinja.ir/jobs/empty", "<p>nothing</p>"),
        )
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(site(), Arc::new(MemoryJobStore::new())));
        let (status, body) = call(app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_crawl_then_list_jobs_with_categories() {
        let store = Arc::new(MemoryJobStore::new());
        let app = build_router(test_state(site(), store));

        let (status, body) = call(
            app.clone(),
            post_json(
                "/api/v1/crawl",
                json!({"start_url": "https://jobinja.ir/jobs?page=1", "max_jobs": 5}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["saved"], 2);
        assert_eq!(body["db_count"], 2);
        assert!(body["run_id"].is_string());

        let (status, body) = call(app, get("/api/v1/jobs?limit=10")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["jobs"][0]["categories"], json!(["IT", "Backend"]));
    }

    #[tokio::test]
    async fn test_crawl_rejects_disallowed_host() {
        let fetcher = site();
        let app = build_router(test_state(fetcher.clone(), Arc::new(MemoryJobStore::new())));

        let (status, body) = call(
            app,
            post_json("/api/v1/crawl", json!({"start_url": "http://localhost:5432/"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_extract_skills_found_and_not_found() {
        let app = build_router(test_state(site(), Arc::new(MemoryJobStore::new())));

        let (status, body) = call(
            app.clone(),
            get("/api/v1/jobs/extract-skills?job_url=https%3A%2F%2Fjobinja.ir%2Fjobs%2F1"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skills"], json!(["Python", "Django"]));

        let (status, body) = call(
            app,
            get("/api/v1/jobs/extract-skills?job_url=https%3A%2F%2Fjobinja.ir%2Fjobs%2Fempty"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "no_skills_found");
    }

    #[tokio::test]
    async fn test_match_with_override_and_with_url() {
        let app = build_router(test_state(site(), Arc::new(MemoryJobStore::new())));
        let candidate = json!([{"name": "python", "level": 5, "samples": 4}]);

        let (status, body) = call(
            app.clone(),
            post_json(
                "/api/v1/match",
                json!({"skills_override": ["python", "go"], "candidate_skills": candidate}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["details"][0]["match_type"], "exact");
        assert_eq!(body["details"][1]["match_type"], "none");
        assert_eq!(body["recommendations"][0]["skill"], "go");

        let (status, body) = call(
            app.clone(),
            post_json(
                "/api/v1/match",
                json!({"job_url": "https://jobinja.ir/jobs/1", "candidate_skills": candidate}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["required_skills"], json!(["Python", "Django"]));

        let (status, _) = call(app, post_json("/api/v1/match", json!({"candidate_skills": []}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_recommendations_rank_stored_jobs() {
        let store = Arc::new(MemoryJobStore::new());
        for (url, skills) in [
            ("https://jobinja.ir/jobs/a", vec!["go", "kafka"]),
            ("https://jobinja.ir/jobs/b", vec!["Python", "Django"]),
        ] {
            let job = JobRecord {
                skills: skills.into_iter().map(String::from).collect(),
                ..JobRecord::empty(url)
            };
            store.save_job(&job, false).await.unwrap();
        }
        let app = build_router(test_state(site(), store));

        let (status, body) = call(app.clone(), get("/api/v1/recommendations?skills=python&skills=django")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["jobs"][0]["url"], "https://jobinja.ir/jobs/b");
        assert_eq!(body["jobs"][0]["status"], "recommended");
        assert_eq!(body["jobs"][1]["status"], "needs_improvement");

        let (status, _) = call(app, get("/api/v1/recommendations")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
