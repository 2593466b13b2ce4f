use serde::{Deserialize, Serialize};

/// One entry of a candidate's skill profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSkill {
    pub name: String,
    /// Proficiency 1–5; anything outside is clamped when scoring.
    pub level: i32,
    /// Evidence samples (past projects and the like).
    #[serde(default)]
    pub samples: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    None,
}

/// Per-required-skill diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetail {
    pub required_skill: String,
    pub matched_with: Option<String>,
    pub match_type: MatchKind,
    /// 100 for exact matches; best similarity otherwise, even below threshold.
    pub fuzzy_score: Option<u8>,
    pub weight: f64,
    pub level: Option<u8>,
    pub sample_count: u32,
    pub sample_multiplier: f64,
    pub skill_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub skill: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub percentage: f64,
    pub total_score: f64,
    pub max_possible_score: f64,
    /// Same order as the required-skills input.
    pub details: Vec<MatchDetail>,
    pub recommendations: Vec<Recommendation>,
}
