use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::cache::SkillsCache;

/// Capacity-bounded in-process cache with per-entry time-to-live.
///
/// At capacity, an insert first purges expired entries and then, if still
/// full, evicts the oldest-inserted one.
pub struct TtlSkillsCache {
    capacity: usize,
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

struct Entry {
    skills: Vec<String>,
    inserted_at: Instant,
}

impl TtlSkillsCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn is_fresh(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.inserted_at) < self.ttl
    }
}

#[async_trait]
impl SkillsCache for TtlSkillsCache {
    async fn get(&self, url: &str) -> Option<Vec<String>> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let entry = entries.get(url)?;
        if self.is_fresh(entry, now) {
            return Some(entry.skills.clone());
        }
        entries.remove(url);
        None
    }

    async fn put(&self, url: &str, skills: Vec<String>) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        if !entries.contains_key(url) && entries.len() >= self.capacity {
            entries.retain(|_, e| self.is_fresh(e, now));
            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.inserted_at)
                    .map(|(k, _)| k.clone());
                if let Some(key) = oldest {
                    entries.remove(&key);
                }
            }
        }

        entries.insert(
            url.to_string(),
            Entry {
                skills,
                inserted_at: now,
            },
        );
    }
}
