//! Recommendation Generator: remediation text from match diagnostics.

use crate::matching::models::{MatchDetail, Recommendation};

/// Levels below this get a "raise your level" recommendation.
pub const PROFICIENCY_FLOOR: u8 = 3;

pub const MUST_LEARN: &str = "This skill must be learned.";

/// One entry per skill that needs action, in detail order.
pub fn recommend(details: &[MatchDetail]) -> Vec<Recommendation> {
    details
        .iter()
        .filter_map(|d| {
            let text = match (&d.matched_with, d.level) {
                (None, _) => MUST_LEARN.to_string(),
                (Some(_), Some(level)) if level < PROFICIENCY_FLOOR => format!(
                    "Skill level is low (current level: {level}). Raising it is recommended."
                ),
                _ => return None,
            };
            Some(Recommendation {
                skill: d.required_skill.clone(),
                recommendation: text,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::matcher::{SkillScorer, WeightedSkillScorer};
    use crate::matching::models::CandidateSkill;

    #[test]
    fn test_only_actionable_skills_are_listed_in_order() {
        let required: Vec<String> = ["go", "rust", "sql", "kafka"].iter().map(|s| s.to_string()).collect();
        let candidate = vec![
            CandidateSkill { name: "rust".into(), level: 4, samples: 0 },
            CandidateSkill { name: "sql".into(), level: 2, samples: 3 },
        ];

        let recs = WeightedSkillScorer.score(&required, &candidate).recommendations;

        let skills: Vec<&str> = recs.iter().map(|r| r.skill.as_str()).collect();
        assert_eq!(skills, vec!["go", "sql", "kafka"]);
        assert_eq!(recs[0].recommendation, MUST_LEARN);
        assert!(recs[1].recommendation.contains("current level: 2"));
        assert_eq!(recs[2].recommendation, MUST_LEARN);
    }
}
