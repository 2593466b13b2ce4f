use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::warn;

use crate::cache::SkillsCache;

const KEY_PREFIX: &str = "jobscout:v1:skills:";

/// Redis-backed skills cache. Every Redis or decode failure logs a warning
/// and degrades to a miss (reads) or a no-op (writes).
pub struct RedisSkillsCache {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisSkillsCache {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    /// PING round trip; used at startup to decide whether to use Redis at all.
    pub async fn is_available(&self) -> bool {
        match self.client.get_multiplexed_async_connection().await {
            Ok(mut conn) => redis::cmd("PING")
                .query_async::<_, String>(&mut conn)
                .await
                .is_ok(),
            Err(_) => false,
        }
    }

    fn key(url: &str) -> String {
        format!("{KEY_PREFIX}{url}")
    }
}

#[async_trait]
impl SkillsCache for RedisSkillsCache {
    async fn get(&self, url: &str) -> Option<Vec<String>> {
        let key = Self::key(url);
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .inspect_err(|e| warn!(error = %e, "redis connection failed"))
            .ok()?;
        let raw: Option<String> = conn
            .get(&key)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis GET failed"))
            .ok()?;
        serde_json::from_str(&raw?)
            .inspect_err(|e| warn!(error = %e, key, "cached skills are not valid JSON"))
            .ok()
    }

    async fn put(&self, url: &str, skills: Vec<String>) {
        let key = Self::key(url);
        let Ok(value) = serde_json::to_string(&skills) else {
            return;
        };
        let Ok(mut conn) = self
            .client
            .get_multiplexed_async_connection()
            .await
            .inspect_err(|e| warn!(error = %e, "redis connection failed"))
        else {
            return;
        };
        let _ = redis::cmd("SET")
            .arg(&key)
            .arg(value)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SET EX failed"));
    }
}
