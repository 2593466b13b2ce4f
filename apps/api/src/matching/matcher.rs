//! Skill Matcher: scores a candidate profile against a posting's required skills.
//!
//! `AppState` holds an `Arc<dyn SkillScorer>`; `WeightedSkillScorer` is the
//! only backend and is pure, deterministic, and synchronous.

use std::collections::HashMap;

use crate::matching::fuzzy::token_sort_ratio;
use crate::matching::models::{CandidateSkill, MatchDetail, MatchKind, MatchResult};
use crate::matching::recommendations::recommend;

// ────────────────────────────────────────────────────────────────────────────
// Scoring constants
// ────────────────────────────────────────────────────────────────────────────

/// Weights for the first required skills, most important first.
pub const PRIORITY_WEIGHTS: [f64; 5] = [1.0, 0.9, 0.8, 0.7, 0.6];
/// Weight of every required skill past the prioritised ones.
pub const TAIL_WEIGHT: f64 = 0.5;
/// Level 1..=5 → multiplier.
pub const LEVEL_MULTIPLIERS: [f64; 5] = [0.2, 0.4, 0.6, 0.8, 1.0];
pub const SAMPLE_BONUS_PER: f64 = 0.05;
pub const SAMPLE_BONUS_CAP: f64 = 0.20;
/// Minimum token-sort similarity accepted as a fuzzy match. Compared against
/// the unrounded score.
pub const FUZZY_THRESHOLD: f64 = 75.0;

pub fn weight_for_index(i: usize) -> f64 {
    PRIORITY_WEIGHTS.get(i).copied().unwrap_or(TAIL_WEIGHT)
}

pub fn level_multiplier(level: u8) -> f64 {
    LEVEL_MULTIPLIERS[usize::from(level.clamp(1, 5)) - 1]
}

pub fn sample_multiplier(samples: u32) -> f64 {
    1.0 + (f64::from(samples) * SAMPLE_BONUS_PER).min(SAMPLE_BONUS_CAP)
}

fn clamp_level(level: i32) -> u8 {
    level.clamp(1, 5) as u8
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Trimmed, lowercased, inner whitespace collapsed.
pub fn normalize_skill(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ────────────────────────────────────────────────────────────────────────────
// Trait
// ────────────────────────────────────────────────────────────────────────────

pub trait SkillScorer: Send + Sync {
    fn score(&self, required: &[String], candidate: &[CandidateSkill]) -> MatchResult;
}

// ────────────────────────────────────────────────────────────────────────────
// WeightedSkillScorer
// ────────────────────────────────────────────────────────────────────────────

/// Exact-then-fuzzy matching with positional weight decay, a proficiency
/// multiplier and a capped evidence bonus.
///
/// skill_score = weight × level_multiplier × sample_multiplier
/// max         = Σ weights × 1.0 × (1 + SAMPLE_BONUS_CAP)
/// percentage  = round(total / max × 100, 2), or 0 when there is nothing to match
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedSkillScorer;

/// Candidate profile indexed by normalised name. A repeated name keeps its
/// first position but takes the later entry's values.
struct CandidateIndex<'a> {
    names: Vec<String>,
    by_name: HashMap<String, &'a CandidateSkill>,
}

impl<'a> CandidateIndex<'a> {
    fn new(candidate: &'a [CandidateSkill]) -> Self {
        let mut names = Vec::new();
        let mut by_name = HashMap::new();
        for skill in candidate {
            let key = normalize_skill(&skill.name);
            if by_name.insert(key.clone(), skill).is_none() {
                names.push(key);
            }
        }
        Self { names, by_name }
    }

    /// Matched skill (if any), match kind and similarity truncated to a whole
    /// number.
    fn lookup(&self, required: &str) -> (Option<&'a CandidateSkill>, MatchKind, Option<u8>) {
        if let Some(skill) = self.by_name.get(required) {
            return (Some(*skill), MatchKind::Exact, Some(100));
        }

        let mut best: Option<(&str, f64)> = None;
        for name in &self.names {
            let score = token_sort_ratio(required, name);
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((name.as_str(), score));
            }
        }

        match best {
            Some((name, score)) if score >= FUZZY_THRESHOLD => {
                (self.by_name.get(name).copied(), MatchKind::Fuzzy, Some(score as u8))
            }
            Some((_, score)) => (None, MatchKind::None, Some(score as u8)),
            None => (None, MatchKind::None, None),
        }
    }
}

impl SkillScorer for WeightedSkillScorer {
    fn score(&self, required: &[String], candidate: &[CandidateSkill]) -> MatchResult {
        let index = CandidateIndex::new(candidate);
        let max_possible: f64 =
            (0..required.len()).map(weight_for_index).sum::<f64>() * (1.0 + SAMPLE_BONUS_CAP);

        let mut total = 0.0;
        let details: Vec<MatchDetail> = required
            .iter()
            .enumerate()
            .map(|(i, req)| {
                let weight = weight_for_index(i);
                let (matched, kind, similarity) = index.lookup(&normalize_skill(req));

                match matched {
                    Some(skill) => {
                        let level = clamp_level(skill.level);
                        let samp_mul = sample_multiplier(skill.samples);
                        let skill_score = weight * level_multiplier(level) * samp_mul;
                        total += skill_score;
                        MatchDetail {
                            required_skill: req.clone(),
                            matched_with: Some(skill.name.clone()),
                            match_type: kind,
                            fuzzy_score: similarity,
                            weight,
                            level: Some(level),
                            sample_count: skill.samples,
                            sample_multiplier: round_to(samp_mul, 3),
                            skill_score: round_to(skill_score, 4),
                        }
                    }
                    None => MatchDetail {
                        required_skill: req.clone(),
                        matched_with: None,
                        match_type: kind,
                        fuzzy_score: similarity,
                        weight,
                        level: None,
                        sample_count: 0,
                        sample_multiplier: 1.0,
                        skill_score: 0.0,
                    },
                }
            })
            .collect();

        let percentage = if max_possible > 0.0 {
            round_to(total / max_possible * 100.0, 2)
        } else {
            0.0
        };

        MatchResult {
            percentage,
            total_score: round_to(total, 4),
            max_possible_score: round_to(max_possible, 4),
            recommendations: recommend(&details),
            details,
        }
    }
}
