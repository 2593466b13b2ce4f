//! Ranks stored postings by how much of each one's skill list a user covers.

use std::collections::HashSet;

use serde::Serialize;

use crate::matching::matcher::normalize_skill;
use crate::models::job::StoredJob;

/// Upper bound on postings considered for one ranking.
pub const RANKING_WINDOW: i64 = 500;
pub const RECOMMENDED_THRESHOLD: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobFit {
    Recommended,
    NeedsImprovement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedJob {
    pub title: String,
    pub url: String,
    pub categories: Vec<String>,
    pub job_skills: Vec<String>,
    pub match_percent: u32,
    pub status: JobFit,
}

/// floor(|job ∩ user| / |job| × 100); 0 for a posting with no skills.
pub fn coverage_percent(job_skills: &[String], user: &HashSet<String>) -> u32 {
    let job: HashSet<String> = job_skills
        .iter()
        .map(|s| normalize_skill(s))
        .filter(|s| !s.is_empty())
        .collect();
    if job.is_empty() {
        return 0;
    }
    let common = job.intersection(user).count();
    (common * 100 / job.len()) as u32
}

/// Highest coverage first; ties keep the input order.
pub fn rank_jobs(jobs: Vec<StoredJob>, user_skills: &[String]) -> Vec<RankedJob> {
    let user: HashSet<String> = user_skills
        .iter()
        .map(|s| normalize_skill(s))
        .filter(|s| !s.is_empty())
        .collect();

    let mut ranked: Vec<RankedJob> = jobs
        .into_iter()
        .map(|job| {
            let match_percent = coverage_percent(&job.skills, &user);
            RankedJob {
                title: job.title,
                url: job.url,
                categories: job.categories,
                job_skills: job.skills,
                match_percent,
                status: if match_percent >= RECOMMENDED_THRESHOLD {
                    JobFit::Recommended
                } else {
                    JobFit::NeedsImprovement
                },
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.match_percent.cmp(&a.match_percent));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stored(id: i64, skills: &[&str]) -> StoredJob {
        StoredJob {
            id,
            title: format!("job {id}"),
            category: String::new(),
            min_education: String::new(),
            location: String::new(),
            work_type: String::new(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            url: format!("https://jobinja.ir/jobs/{id}"),
            fetched_at: Utc::now(),
            categories: vec![],
        }
    }

    fn user(skills: &[&str]) -> Vec<String> {
        skills.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_coverage_is_floored() {
        let u: HashSet<String> = ["python".to_string()].into();
        let job = user(&["Python", "Django", "SQL"]);
        assert_eq!(coverage_percent(&job, &u), 33);
    }

    #[test]
    fn test_ranking_order_and_status() {
        let jobs = vec![
            stored(1, &["go", "kafka"]),
            stored(2, &["Python", "Django"]),
            stored(3, &[]),
            stored(4, &["python", "docker"]),
        ];

        let ranked = rank_jobs(jobs, &user(&[" python ", "django"]));

        let order: Vec<&str> = ranked.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(order, vec!["job 2", "job 4", "job 1", "job 3"]);
        assert_eq!(ranked[0].match_percent, 100);
        assert_eq!(ranked[1].status, JobFit::Recommended);
        assert_eq!(ranked[2].status, JobFit::NeedsImprovement);
        assert_eq!(ranked[3].match_percent, 0);
    }
}
