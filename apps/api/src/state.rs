use std::sync::Arc;

use crate::cache::SkillsCache;
use crate::config::Config;
use crate::crawl::allowlist::HostAllowlist;
use crate::crawl::fetcher::PageFetcher;
use crate::crawl::live::LiveSkills;
use crate::crawl::orchestrator::{Crawler, VisitedUrls};
use crate::crawl::rules::ExtractionRules;
use crate::matching::matcher::SkillScorer;
use crate::store::JobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub skills_cache: Arc<dyn SkillsCache>,
    /// Pluggable skill scorer. Default: WeightedSkillScorer.
    pub scorer: Arc<dyn SkillScorer>,
    pub rules: Arc<ExtractionRules>,
    /// Posting URLs dispatched by any crawl since startup.
    pub visited: Arc<VisitedUrls>,
    pub allowlist: HostAllowlist,
    pub config: Config,
}

impl AppState {
    pub fn crawler(&self) -> Crawler {
        Crawler::new(
            self.fetcher.clone(),
            self.store.clone(),
            self.rules.clone(),
            self.visited.clone(),
            self.allowlist.clone(),
        )
    }

    pub fn live_skills(&self) -> LiveSkills<'_> {
        LiveSkills {
            fetcher: self.fetcher.as_ref(),
            cache: self.skills_cache.as_ref(),
            rules: &self.rules,
            allowlist: &self.allowlist,
        }
    }
}
