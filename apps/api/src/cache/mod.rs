//! Skills extraction cache, keyed by posting URL.
//!
//! `AppState` holds an `Arc<dyn SkillsCache>`: the in-process TTL cache by
//! default, Redis when `REDIS_URL` is set and reachable. Backends never fail
//! the caller; a broken cache behaves like an empty one.

pub mod redis_backend;
pub mod ttl;

use async_trait::async_trait;

pub use redis_backend::RedisSkillsCache;
pub use ttl::TtlSkillsCache;

#[async_trait]
pub trait SkillsCache: Send + Sync {
    async fn get(&self, url: &str) -> Option<Vec<String>>;
    async fn put(&self, url: &str, skills: Vec<String>);
}
