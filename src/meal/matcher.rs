/// End-to-end label matching.
use tracing::info;

use super::candidates::{CandidateGenerator, derive_keywords};
use super::keywords::LabelNormalizer;
use super::labels::select_food_labels;
use super::ranking::{Scorer, rank};
use super::{MatchOutcome, RecognizedLabel, VisionLabel};
use crate::config::{Config, MatchingConfig, ScoringConfig, VisionConfig};
use crate::dataset::{DatasetError, NutritionLookup};
use crate::upstream::VisionAnnotations;

/// Immutable after construction; one instance can serve any number of
/// requests.
#[derive(Debug, Clone)]
pub struct FoodMatcher {
    normalizer: LabelNormalizer,
    vision: VisionConfig,
    matching: MatchingConfig,
    scoring: ScoringConfig,
}

impl Default for FoodMatcher {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl FoodMatcher {
    pub fn from_config(config: &Config) -> Self {
        Self {
            normalizer: LabelNormalizer::from_mappings(&config.matching.label_keywords),
            vision: config.vision.clone(),
            matching: config.matching.clone(),
            scoring: config.scoring.clone(),
        }
    }

    pub fn normalizer(&self) -> &LabelNormalizer {
        &self.normalizer
    }

    /// Filter raw annotations, then match.
    pub fn match_annotations<D: NutritionLookup + ?Sized>(
        &self,
        dataset: &D,
        annotations: &VisionAnnotations,
    ) -> Result<MatchOutcome, DatasetError> {
        let labels = select_food_labels(annotations, &self.vision);
        self.match_labels(dataset, &labels)
    }

    /// Match already-filtered labels (relevance order) against the dataset.
    pub fn match_labels<D: NutritionLookup + ?Sized>(
        &self,
        dataset: &D,
        labels: &[VisionLabel],
    ) -> Result<MatchOutcome, DatasetError> {
        let recognized: Vec<RecognizedLabel> = labels
            .iter()
            .map(|l| RecognizedLabel {
                label: l.description.clone(),
                confidence: l.score,
                keyword: self.normalizer.normalize(&l.description).map(str::to_string),
            })
            .collect();

        if labels.is_empty() {
            info!("no food labels recognized");
            return Ok(MatchOutcome::NotFound {
                recognized_labels: recognized,
            });
        }

        let keywords = derive_keywords(&self.normalizer, labels);
        info!("keywords: {keywords:?}");

        let generator =
            CandidateGenerator::new(dataset, &self.normalizer, self.matching.multi_keyword_limit);
        let candidates = generator.generate(labels, &keywords)?;

        let scorer = Scorer::new(&self.scoring);
        let outcome = rank(
            &scorer,
            candidates,
            &keywords,
            self.matching.max_candidates,
            recognized,
        );

        match &outcome {
            MatchOutcome::Found(result) => info!(
                "matched {} candidates, recommending {}",
                result.total_candidates, result.recommended.food_name
            ),
            MatchOutcome::NotFound { .. } => info!("no dataset match for recognized labels"),
        }
        Ok(outcome)
    }
}
