/// Candidate scoring and ranking.
///
/// Per-label candidates keep the vision score of their label. Multi-keyword
/// candidates start from a higher base and are adjusted by how specific and
/// how "dish-like" their name is. Every adjustment is additive and applied
/// independently; see the regression tests for how they stack.
use std::collections::BTreeMap;

use tracing::debug;

use super::candidates::Candidate;
use super::{MatchCandidate, MatchOutcome, MatchResult, NutrientSnapshot, RecognizedLabel};
use crate::config::ScoringConfig;

pub struct Scorer<'a> {
    config: &'a ScoringConfig,
}

impl<'a> Scorer<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, candidate: &Candidate, keywords: &[String]) -> f64 {
        match candidate.label_score {
            Some(score) => score,
            None => self.score_joint(&candidate.record.food_name, keywords),
        }
    }

    /// Score of a name found by the multi-keyword stage.
    pub fn score_joint(&self, name: &str, keywords: &[String]) -> f64 {
        let cfg = self.config;
        let name_len = name.chars().count();
        let mut score = cfg.multi_keyword_base;

        // shorter names are more specific dishes
        if let Some(bracket) = cfg.length_brackets.iter().find(|b| name_len <= b.max_chars) {
            score += bracket.bonus;
        }

        if cfg.kit_markers.iter().any(|m| name.contains(m.as_str())) {
            score -= cfg.kit_penalty;
        }
        let delimiter = cfg.segment_delimiter.as_str();
        if name.contains(delimiter) && name.split(delimiter).count() > cfg.max_segments {
            score -= cfg.segment_penalty;
        }

        for preferred in &cfg.preferred_names {
            if name == preferred {
                score += cfg.exact_name_bonus;
                break;
            }
            if name.starts_with(preferred.as_str()) && !name.contains(delimiter) {
                score += cfg.prefix_name_bonus;
                break;
            }
        }

        for rule in &cfg.dominant {
            if !rule.triggers.iter().any(|t| keywords.contains(t)) {
                continue;
            }
            if name.contains(rule.primary.as_str()) {
                score += rule.bonus;
            } else if rule.synonyms.iter().any(|s| name.contains(s.as_str())) {
                score -= rule.penalty;
            }
        }

        for keyword in keywords {
            if name.starts_with(keyword.as_str())
                && name_len <= keyword.chars().count() + cfg.prefix_coverage_slack
            {
                score += cfg.prefix_coverage_bonus;
            }
        }

        if !keywords.is_empty() && keywords.iter().all(|k| name.contains(k.as_str())) {
            score += cfg.full_coverage_bonus;
        }

        score
    }
}

/// Score, sort (stable, descending) and package candidates.
pub fn rank(
    scorer: &Scorer<'_>,
    candidates: Vec<Candidate>,
    keywords: &[String],
    max_candidates: usize,
    recognized_labels: Vec<RecognizedLabel>,
) -> MatchOutcome {
    let mut scored: Vec<MatchCandidate> = candidates
        .into_iter()
        .map(|c| MatchCandidate {
            confidence_score: scorer.score(&c, keywords),
            nutrients: NutrientSnapshot::from(&c.record),
            food_name: c.record.food_name,
            match_tier: c.tier,
            recognized_label: c.recognized_label,
            original_label: c.original_label,
        })
        .collect();

    // sort_by is stable: ties keep generation order
    scored.sort_by(|a, b| b.confidence_score.total_cmp(&a.confidence_score));

    let Some(recommended) = scored.first().cloned() else {
        return MatchOutcome::NotFound { recognized_labels };
    };

    let mut candidates_by_keyword: BTreeMap<String, Vec<MatchCandidate>> = BTreeMap::new();
    for c in &scored {
        candidates_by_keyword
            .entry(c.recognized_label.clone())
            .or_default()
            .push(c.clone());
    }

    debug!(
        "recommended {} ({:.2}) out of {}",
        recommended.food_name,
        recommended.confidence_score,
        scored.len()
    );

    MatchOutcome::Found(MatchResult {
        recommended,
        total_candidates: scored.len(),
        candidates: scored.into_iter().take(max_candidates).collect(),
        candidates_by_keyword,
        recognized_labels,
    })
}
