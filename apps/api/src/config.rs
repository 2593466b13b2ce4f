use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Unset means the in-process skills cache.
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub allowed_hosts: Vec<String>,
    pub fetch_timeout_secs: u64,
    pub crawl_concurrency: usize,
    pub crawl_delay_ms: u64,
    pub skills_cache_capacity: usize,
    pub skills_cache_ttl_secs: u64,
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: std::env::var("REDIS_URL").ok().filter(|u| !u.trim().is_empty()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            allowed_hosts: split_hosts(
                &std::env::var("ALLOWED_HOSTS").unwrap_or_else(|_| "jobinja.ir".to_string()),
            ),
            fetch_timeout_secs: parse_env("FETCH_TIMEOUT_SECS", 10)?,
            crawl_concurrency: parse_env("CRAWL_CONCURRENCY", 10)?,
            crawl_delay_ms: parse_env("CRAWL_DELAY_MS", 800)?,
            skills_cache_capacity: parse_env("SKILLS_CACHE_CAPACITY", 1000)?,
            skills_cache_ttl_secs: parse_env("SKILLS_CACHE_TTL_SECS", 3600)?,
            user_agent: std::env::var("CRAWLER_USER_AGENT")
                .unwrap_or_else(|_| "Mozilla/5.0 (JobCrawler/1.0)".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn split_hosts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect()
}
