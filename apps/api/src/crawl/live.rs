//! Live single-posting skill extraction, fronted by the skills cache.

use tracing::{debug, info};

use crate::cache::SkillsCache;
use crate::crawl::allowlist::HostAllowlist;
use crate::crawl::extractor::extract_skills_from_html;
use crate::crawl::fetcher::PageFetcher;
use crate::crawl::rules::ExtractionRules;
use crate::crawl::CrawlError;

pub struct LiveSkills<'a> {
    pub fetcher: &'a dyn PageFetcher,
    pub cache: &'a dyn SkillsCache,
    pub rules: &'a ExtractionRules,
    pub allowlist: &'a HostAllowlist,
}

impl LiveSkills<'_> {
    /// Skills of the posting at `job_url`. An empty extraction is reported as
    /// `NothingExtracted` and never cached.
    pub async fn extract(&self, job_url: &str) -> Result<Vec<String>, CrawlError> {
        let url = self.allowlist.check(job_url)?;

        if let Some(skills) = self.cache.get(url.as_str()).await {
            debug!(url = %url, "skills cache hit");
            return Ok(skills);
        }

        let html = self
            .fetcher
            .fetch(url.as_str())
            .await
            .map_err(CrawlError::PostingFetch)?;
        let skills = extract_skills_from_html(&html, self.rules);
        if skills.is_empty() {
            return Err(CrawlError::NothingExtracted(url.to_string()));
        }

        info!(url = %url, count = skills.len(), "extracted skills");
        self.cache.put(url.as_str(), skills.clone()).await;
        Ok(skills)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cache::TtlSkillsCache;
    use crate::crawl::fetcher::testing::StaticFetcher;

    const POSTING: &str = r#"<li class="c-infoBox__item"><h4 class="c-infoBox__itemTitle">مهارت‌ها</h4>
        <div class="tags"><span>Python</span><span>Django</span></div></li>"#;

    fn fixtures() -> (StaticFetcher, TtlSkillsCache, ExtractionRules, HostAllowlist) {
        (
            StaticFetcher::default()
                .with_page("https://jobinja.ir/jobs/1", POSTING)
                .with_page("https://jobinja.ir/jobs/blank", "<p>nothing</p>"),
            TtlSkillsCache::new(10, Duration::from_secs(60)),
            ExtractionRules::jobinja(),
            HostAllowlist::new(["jobinja.ir"]),
        )
    }

    #[tokio::test]
    async fn test_second_lookup_served_from_cache() {
        let (fetcher, cache, rules, allowlist) = fixtures();
        let live = LiveSkills {
            fetcher: &fetcher,
            cache: &cache,
            rules: &rules,
            allowlist: &allowlist,
        };

        assert_eq!(live.extract("https://jobinja.ir/jobs/1").await.unwrap(), vec!["Python", "Django"]);
        assert_eq!(live.extract("https://jobinja.ir/jobs/1").await.unwrap(), vec!["Python", "Django"]);
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_extraction_is_not_found_and_not_cached() {
        let (fetcher, cache, rules, allowlist) = fixtures();
        let live = LiveSkills {
            fetcher: &fetcher,
            cache: &cache,
            rules: &rules,
            allowlist: &allowlist,
        };

        for _ in 0..2 {
            assert!(matches!(
                live.extract("https://jobinja.ir/jobs/blank").await,
                Err(CrawlError::NothingExtracted(_))
            ));
        }
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_disallowed_host_never_fetched() {
        let (fetcher, cache, rules, allowlist) = fixtures();
        let live = LiveSkills {
            fetcher: &fetcher,
            cache: &cache,
            rules: &rules,
            allowlist: &allowlist,
        };

        assert!(matches!(
            live.extract("http://169.254.169.254/latest").await,
            Err(CrawlError::HostNotAllowed(_))
        ));
        assert!(fetcher.requests().is_empty());
    }
}
