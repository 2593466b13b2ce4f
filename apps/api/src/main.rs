mod cache;
mod config;
mod crawl;
mod db;
mod errors;
mod matching;
mod models;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::{RedisSkillsCache, SkillsCache, TtlSkillsCache};
use crate::config::Config;
use crate::crawl::allowlist::HostAllowlist;
use crate::crawl::fetcher::HttpFetcher;
use crate::crawl::orchestrator::VisitedUrls;
use crate::crawl::rules::ExtractionRules;
use crate::db::{create_pool, run_migrations};
use crate::matching::matcher::WeightedSkillScorer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgJobStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("jobscout_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobScout API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    let fetcher = HttpFetcher::new(
        Duration::from_secs(config.fetch_timeout_secs),
        &config.user_agent,
    )?;
    info!(
        "HTTP fetcher initialized (timeout: {}s)",
        config.fetch_timeout_secs
    );

    let skills_cache = build_skills_cache(&config).await;
    let allowlist = HostAllowlist::new(&config.allowed_hosts);
    info!("Crawl allowlist: {:?}", config.allowed_hosts);

    // Build app state
    let state = AppState {
        store: Arc::new(PgJobStore::new(db)),
        fetcher: Arc::new(fetcher),
        skills_cache,
        scorer: Arc::new(WeightedSkillScorer),
        rules: Arc::new(ExtractionRules::jobinja()),
        visited: Arc::new(VisitedUrls::new()),
        allowlist,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Redis when configured and reachable, otherwise the in-process TTL cache.
async fn build_skills_cache(config: &Config) -> Arc<dyn SkillsCache> {
    if let Some(url) = &config.redis_url {
        match redis::Client::open(url.as_str()) {
            Ok(client) => {
                let cache = RedisSkillsCache::new(client, config.skills_cache_ttl_secs);
                if cache.is_available().await {
                    info!("Skills cache: Redis");
                    return Arc::new(cache);
                }
                warn!("Redis unreachable, falling back to in-process skills cache");
            }
            Err(e) => warn!(error = %e, "invalid REDIS_URL, falling back to in-process skills cache"),
        }
    }

    info!(
        "Skills cache: in-process (capacity {}, ttl {}s)",
        config.skills_cache_capacity, config.skills_cache_ttl_secs
    );
    Arc::new(TtlSkillsCache::new(
        config.skills_cache_capacity,
        Duration::from_secs(config.skills_cache_ttl_secs),
    ))
}
