//! Food photo matching.
//!
//! Vision labels are filtered ([`labels`]), normalized to Korean keywords
//! ([`keywords`]), turned into dataset candidates ([`candidates`]) and
//! scored and ranked ([`ranking`]). [`matcher::FoodMatcher`] runs the whole
//! chain.

pub mod candidates;
pub mod keywords;
pub mod labels;
pub mod matcher;
pub mod ranking;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::db::models::{DEFAULT_SERVING_GRAMS, NutritionRecord};

/// A vision label after filtering, in relevance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionLabel {
    pub description: String,
    pub score: f64,
}

impl VisionLabel {
    pub fn new(description: &str, score: f64) -> Self {
        Self {
            description: description.to_string(),
            score,
        }
    }
}

/// Which lookup produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchTier {
    MultiKeyword,
    Exact,
    Partial,
    Reverse,
}

/// Nutrients copied from the dataset record. Missing nutrients read as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientSnapshot {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub serving_size_grams: f64,
}

impl From<&NutritionRecord> for NutrientSnapshot {
    fn from(r: &NutritionRecord) -> Self {
        Self {
            calories: r.calories.unwrap_or(0.0),
            protein: r.protein.unwrap_or(0.0),
            fat: r.fat.unwrap_or(0.0),
            carbs: r.carbs.unwrap_or(0.0),
            serving_size_grams: r.serving_size_grams.unwrap_or(DEFAULT_SERVING_GRAMS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub food_name: String,
    #[serde(flatten)]
    pub nutrients: NutrientSnapshot,
    pub confidence_score: f64,
    pub match_tier: MatchTier,
    pub recognized_label: String,
    pub original_label: String,
}

/// A filtered label as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedLabel {
    pub label: String,
    pub confidence: f64,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub recommended: MatchCandidate,
    pub candidates: Vec<MatchCandidate>,
    pub total_candidates: usize,
    pub candidates_by_keyword: BTreeMap<String, Vec<MatchCandidate>>,
    pub recognized_labels: Vec<RecognizedLabel>,
}

/// Either a ranked result or a not-found outcome. Not finding a food is an
/// answer, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum MatchOutcome {
    Found(MatchResult),
    NotFound {
        #[serde(rename = "recognizedLabels")]
        recognized_labels: Vec<RecognizedLabel>,
    },
}

impl MatchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, MatchOutcome::Found(_))
    }

    pub fn recommended(&self) -> Option<&MatchCandidate> {
        match self {
            MatchOutcome::Found(result) => Some(&result.recommended),
            MatchOutcome::NotFound { .. } => None,
        }
    }
}
