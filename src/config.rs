/// Configuration module for nutriscan.
///
/// Everything tunable about matching lives here: the label→keyword table,
/// vision label filters and the scoring weights. The scan/match/rank
/// algorithms themselves are fixed in code.
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::meal::keywords::DEFAULT_LABEL_KEYWORDS;

/// Current configuration schema version.
pub const CONFIG_VERSION: u32 = 1;

pub const OCR_URL_ENV: &str = "NAVER_CLOVA_OCR_URL";
pub const OCR_SECRET_ENV: &str = "NAVER_CLOVA_OCR_SECRET";
pub const VISION_KEY_ENV: &str = "GOOGLE_VISION_API_KEY";

// ── Default value functions ──────────────────────────────────────────

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_db_path() -> String {
    "./nutrition.db".to_string()
}

fn default_vision_endpoint() -> String {
    "https://vision.googleapis.com/v1/images:annotate".to_string()
}

fn default_max_results() -> usize {
    10
}

fn default_min_score() -> f64 {
    0.5
}

fn default_max_objects() -> usize {
    3
}

fn default_max_labels() -> usize {
    5
}

fn default_object_score_weight() -> f64 {
    1.2
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_food_object_keywords() -> Vec<String> {
    strings(&[
        "food", "dish", "meal", "cuisine", "stew", "soup", "curry", "tofu", "kimchi", "jjigae",
    ])
}

fn default_non_food_labels() -> Vec<String> {
    strings(&[
        "cookware",
        "bakeware",
        "bowl",
        "recipe",
        "cooking",
        "dish",
        "plate",
        "tableware",
    ])
}

fn default_generic_labels() -> Vec<String> {
    strings(&["food"])
}

fn default_label_keywords() -> Vec<KeywordMapping> {
    DEFAULT_LABEL_KEYWORDS
        .iter()
        .map(|(label, keyword)| KeywordMapping {
            label: label.to_string(),
            keyword: keyword.to_string(),
        })
        .collect()
}

fn default_multi_keyword_limit() -> usize {
    10
}

fn default_max_candidates() -> usize {
    10
}

fn default_multi_keyword_base() -> f64 {
    1.5
}

fn default_length_brackets() -> Vec<LengthBracket> {
    [(8, 0.5), (12, 0.3), (15, 0.2), (20, 0.1)]
        .into_iter()
        .map(|(max_chars, bonus)| LengthBracket { max_chars, bonus })
        .collect()
}

fn default_kit_markers() -> Vec<String> {
    strings(&["간편조리세트", "_간편"])
}

fn default_kit_penalty() -> f64 {
    0.6
}

fn default_segment_delimiter() -> String {
    "_".to_string()
}

fn default_max_segments() -> usize {
    2
}

fn default_segment_penalty() -> f64 {
    0.3
}

fn default_preferred_names() -> Vec<String> {
    strings(&["햄버거", "순두부찌개", "두부찌개", "김치찌개"])
}

fn default_exact_name_bonus() -> f64 {
    1.0
}

fn default_prefix_name_bonus() -> f64 {
    0.5
}

fn default_dominant_rules() -> Vec<DominantKeywordRule> {
    vec![DominantKeywordRule {
        triggers: strings(&["버거", "햄버거"]),
        primary: "햄버거".to_string(),
        bonus: 0.8,
        synonyms: strings(&["샌드위치"]),
        penalty: 0.3,
    }]
}

fn default_prefix_coverage_slack() -> usize {
    10
}

fn default_coverage_bonus() -> f64 {
    0.3
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default)]
    pub ocr: OcrConfig,

    #[serde(default)]
    pub vision_api: VisionApiConfig,

    #[serde(default)]
    pub vision: VisionConfig,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// OCR endpoint credentials. Environment variables take precedence.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct OcrConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// Image labeling endpoint. The API key comes from the environment or the file.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VisionApiConfig {
    #[serde(default = "default_vision_endpoint")]
    pub endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-feature result cap sent with the request.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

/// Filters applied to raw vision annotations before matching.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VisionConfig {
    #[serde(default = "default_min_score")]
    pub min_score: f64,

    #[serde(default = "default_max_objects")]
    pub max_objects: usize,

    #[serde(default = "default_max_labels")]
    pub max_labels: usize,

    /// Localized objects are more specific than whole-image labels.
    #[serde(default = "default_object_score_weight")]
    pub object_score_weight: f64,

    #[serde(default = "default_food_object_keywords")]
    pub food_object_keywords: Vec<String>,

    #[serde(default = "default_non_food_labels")]
    pub non_food_labels: Vec<String>,

    /// Labels dropped when they match exactly (case-insensitive).
    #[serde(default = "default_generic_labels")]
    pub generic_labels: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct KeywordMapping {
    pub label: String,
    pub keyword: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MatchingConfig {
    #[serde(default = "default_label_keywords")]
    pub label_keywords: Vec<KeywordMapping>,

    #[serde(default = "default_multi_keyword_limit")]
    pub multi_keyword_limit: usize,

    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LengthBracket {
    pub max_chars: usize,
    pub bonus: f64,
}

/// Boost names carrying `primary` when any trigger keyword was derived;
/// penalize names that only carry a near-synonym.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DominantKeywordRule {
    pub triggers: Vec<String>,
    pub primary: String,
    pub bonus: f64,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub penalty: f64,
}

/// Weights for multi-keyword candidates.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScoringConfig {
    #[serde(default = "default_multi_keyword_base")]
    pub multi_keyword_base: f64,

    /// Checked in order; the first bracket the name fits in applies.
    #[serde(default = "default_length_brackets")]
    pub length_brackets: Vec<LengthBracket>,

    #[serde(default = "default_kit_markers")]
    pub kit_markers: Vec<String>,

    #[serde(default = "default_kit_penalty")]
    pub kit_penalty: f64,

    #[serde(default = "default_segment_delimiter")]
    pub segment_delimiter: String,

    #[serde(default = "default_max_segments")]
    pub max_segments: usize,

    #[serde(default = "default_segment_penalty")]
    pub segment_penalty: f64,

    #[serde(default = "default_preferred_names")]
    pub preferred_names: Vec<String>,

    #[serde(default = "default_exact_name_bonus")]
    pub exact_name_bonus: f64,

    #[serde(default = "default_prefix_name_bonus")]
    pub prefix_name_bonus: f64,

    #[serde(default = "default_dominant_rules")]
    pub dominant: Vec<DominantKeywordRule>,

    #[serde(default = "default_prefix_coverage_slack")]
    pub prefix_coverage_slack: usize,

    #[serde(default = "default_coverage_bonus")]
    pub prefix_coverage_bonus: f64,

    #[serde(default = "default_coverage_bonus")]
    pub full_coverage_bonus: f64,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            db_path: default_db_path(),
            ocr: OcrConfig::default(),
            vision_api: VisionApiConfig::default(),
            vision: VisionConfig::default(),
            matching: MatchingConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl Default for VisionApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_vision_endpoint(),
            api_key: None,
            max_results: default_max_results(),
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            max_objects: default_max_objects(),
            max_labels: default_max_labels(),
            object_score_weight: default_object_score_weight(),
            food_object_keywords: default_food_object_keywords(),
            non_food_labels: default_non_food_labels(),
            generic_labels: default_generic_labels(),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            label_keywords: default_label_keywords(),
            multi_keyword_limit: default_multi_keyword_limit(),
            max_candidates: default_max_candidates(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            multi_keyword_base: default_multi_keyword_base(),
            length_brackets: default_length_brackets(),
            kit_markers: default_kit_markers(),
            kit_penalty: default_kit_penalty(),
            segment_delimiter: default_segment_delimiter(),
            max_segments: default_max_segments(),
            segment_penalty: default_segment_penalty(),
            preferred_names: default_preferred_names(),
            exact_name_bonus: default_exact_name_bonus(),
            prefix_name_bonus: default_prefix_name_bonus(),
            dominant: default_dominant_rules(),
            prefix_coverage_slack: default_prefix_coverage_slack(),
            prefix_coverage_bonus: default_coverage_bonus(),
            full_coverage_bonus: default_coverage_bonus(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to `"config.json"`.
    /// If the file does not exist, returns a default config and generates a
    /// template for the default path. OCR credentials from the environment
    /// override the file.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            "config.json"
        } else {
            config_path
        };

        let mut cfg = if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            if path == "config.json" {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }
            cfg
        } else {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {path}"))?;

            match serde_json::from_str::<Config>(&data) {
                Ok(c) => {
                    info!("Loaded configuration from {path}");
                    c
                }
                Err(e) => {
                    warn!("Invalid JSON in {path}: {e}");
                    warn!("Using default configuration");
                    Self::default()
                }
            }
        };

        if cfg.version > CONFIG_VERSION {
            warn!(
                "{path} has version {}, this build understands up to {CONFIG_VERSION}",
                cfg.version
            );
        }

        cfg.apply_env();
        Ok(cfg)
    }

    /// Override credentials from `NAVER_CLOVA_OCR_URL`, `NAVER_CLOVA_OCR_SECRET`
    /// and `GOOGLE_VISION_API_KEY`.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(OCR_URL_ENV) {
            self.ocr.url = Some(url);
        }
        if let Ok(secret) = std::env::var(OCR_SECRET_ENV) {
            self.ocr.secret = Some(secret);
        }
        if let Ok(key) = std::env::var(VISION_KEY_ENV) {
            self.vision_api.api_key = Some(key);
        }
    }

    /// Save configuration to a JSON file. The OCR secret and the vision API
    /// key are never written.
    pub fn save(&self, path: &str) -> Result<()> {
        let mut copy = self.clone();
        copy.ocr.secret = None;
        copy.vision_api.api_key = None;
        let data = serde_json::to_string_pretty(&copy).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.vision.min_score),
            "vision.min_score must be within [0, 1]"
        );
        anyhow::ensure!(
            self.vision.max_labels > 0,
            "vision.max_labels must be positive"
        );
        anyhow::ensure!(
            !self.matching.label_keywords.is_empty(),
            "matching.label_keywords must not be empty"
        );
        anyhow::ensure!(
            self.matching
                .label_keywords
                .iter()
                .all(|m| !m.label.is_empty() && !m.keyword.is_empty()),
            "matching.label_keywords entries must have a label and a keyword"
        );
        anyhow::ensure!(
            self.matching.multi_keyword_limit > 0,
            "matching.multi_keyword_limit must be positive"
        );
        anyhow::ensure!(
            self.matching.max_candidates > 0,
            "matching.max_candidates must be positive"
        );
        anyhow::ensure!(
            self.scoring
                .length_brackets
                .windows(2)
                .all(|w| w[0].max_chars < w[1].max_chars),
            "scoring.length_brackets must be in ascending max_chars order"
        );
        anyhow::ensure!(
            !self.scoring.segment_delimiter.is_empty(),
            "scoring.segment_delimiter must not be empty"
        );
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
