/// Staged candidate generation against the nutrition dataset.
///
/// Stage 1 looks for dishes whose names carry every derived keyword at once
/// (김치 + 찌개 → 김치찌개); compound names are only reachable that way.
/// Stage 2 then tries each label on its own: exact raw label, exact keyword,
/// name containing the keyword, name containing the keyword's first word.
/// A food name is emitted at most once per request.
use std::collections::HashSet;

use tracing::debug;

use super::keywords::LabelNormalizer;
use super::{MatchTier, VisionLabel};
use crate::dataset::{DatasetError, NutritionLookup};
use crate::db::models::NutritionRecord;

/// A dataset hit before scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub record: NutritionRecord,
    pub tier: MatchTier,
    /// Recognition score of the originating label; `None` for multi-keyword hits.
    pub label_score: Option<f64>,
    pub recognized_label: String,
    pub original_label: String,
}

/// Distinct keywords derived from `labels`, in label order.
pub fn derive_keywords(normalizer: &LabelNormalizer, labels: &[VisionLabel]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for label in labels {
        if let Some(k) = normalizer.normalize(&label.description) {
            if !keywords.iter().any(|existing| existing == k) {
                keywords.push(k.to_string());
            }
        }
    }
    keywords
}

pub struct CandidateGenerator<'a, D: NutritionLookup + ?Sized> {
    dataset: &'a D,
    normalizer: &'a LabelNormalizer,
    multi_keyword_limit: usize,
}

impl<'a, D: NutritionLookup + ?Sized> CandidateGenerator<'a, D> {
    pub fn new(
        dataset: &'a D,
        normalizer: &'a LabelNormalizer,
        multi_keyword_limit: usize,
    ) -> Self {
        Self {
            dataset,
            normalizer,
            multi_keyword_limit,
        }
    }

    /// Run both stages. `keywords` must come from [`derive_keywords`] on the same labels.
    pub fn generate(
        &self,
        labels: &[VisionLabel],
        keywords: &[String],
    ) -> Result<Vec<Candidate>, DatasetError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates = Vec::new();

        if keywords.len() >= 2 {
            let joined = keywords.join(" + ");
            let hits = self
                .dataset
                .find_containing_all(keywords, self.multi_keyword_limit)?;
            debug!("multi-keyword {joined}: {} hits", hits.len());

            for record in hits {
                if seen.insert(record.food_name.clone()) {
                    candidates.push(Candidate {
                        record,
                        tier: MatchTier::MultiKeyword,
                        label_score: None,
                        recognized_label: joined.clone(),
                        original_label: joined.clone(),
                    });
                }
            }
        }

        for label in labels {
            let keyword = self.normalizer.normalize(&label.description);
            let Some((record, tier)) = self.lookup_label(&label.description, keyword)? else {
                debug!("no dataset match for {:?}", label.description);
                continue;
            };

            if !seen.insert(record.food_name.clone()) {
                debug!("{} already matched", record.food_name);
                continue;
            }
            candidates.push(Candidate {
                record,
                tier,
                label_score: Some(label.score),
                recognized_label: keyword.unwrap_or(&label.description).to_string(),
                original_label: label.description.clone(),
            });
        }

        Ok(candidates)
    }

    /// First hit of the per-label tiers, in order.
    fn lookup_label(
        &self,
        raw: &str,
        keyword: Option<&str>,
    ) -> Result<Option<(NutritionRecord, MatchTier)>, DatasetError> {
        if let Some(r) = self.dataset.find_exact(raw)? {
            return Ok(Some((r, MatchTier::Exact)));
        }
        if let Some(k) = keyword {
            if let Some(r) = self.dataset.find_exact(k)? {
                return Ok(Some((r, MatchTier::Exact)));
            }
        }

        let term = keyword.unwrap_or(raw);
        if let Some(r) = self.dataset.find_containing(term)? {
            return Ok(Some((r, MatchTier::Partial)));
        }

        // "fried chicken" → "fried"; single-word terms were already tried above
        if term.chars().count() > 2 {
            if let Some(first) = term.split_whitespace().next() {
                if first != term {
                    if let Some(r) = self.dataset.find_containing(first)? {
                        return Ok(Some((r, MatchTier::Reverse)));
                    }
                }
            }
        }

        Ok(None)
    }
}
