//! Body-composition result sheet extraction.
//!
//! OCR tokens come in reading order; [`tokens::locate_section`] bounds the
//! current composition table and [`extractor::FieldExtractor`] walks the
//! [`metrics::METRICS`] table over it.

pub mod extractor;
pub mod metrics;
pub mod tokens;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use self::metrics::Metric;

/// Values read from one result sheet. Every field is optional; a field that
/// could not be located stays `None` for the user to fill in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyComposition {
    pub test_date: Option<NaiveDate>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub muscle_mass: Option<f64>,
    pub fat_mass: Option<f64>,
    pub bmi: Option<f64>,
    pub body_fat_percentage: Option<f64>,
    pub basal_metabolic_rate: Option<u32>,
    pub body_water: Option<f64>,
    pub protein: Option<f64>,
    pub lean_body_mass: Option<f64>,
    pub visceral_fat_level: Option<u32>,
    pub waist_hip_ratio: Option<f64>,
    #[serde(default)]
    pub segmental_analysis: BTreeMap<String, f64>,
}

impl BodyComposition {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Weight => self.weight,
            Metric::MuscleMass => self.muscle_mass,
            Metric::FatMass => self.fat_mass,
            Metric::Bmi => self.bmi,
            Metric::BodyFatPercentage => self.body_fat_percentage,
            Metric::BasalMetabolicRate => self.basal_metabolic_rate.map(f64::from),
            Metric::BodyWater => self.body_water,
            Metric::Protein => self.protein,
            Metric::LeanBodyMass => self.lean_body_mass,
            Metric::VisceralFatLevel => self.visceral_fat_level.map(f64::from),
            Metric::WaistHipRatio => self.waist_hip_ratio,
        }
    }

    /// Store `value` unless the field already holds one. Returns whether the
    /// write happened. Integer fields keep the whole part; rounding is the
    /// metric table's call.
    pub(crate) fn set_once(&mut self, metric: Metric, value: f64) -> bool {
        if self.get(metric).is_some() {
            return false;
        }
        match metric {
            Metric::Weight => self.weight = Some(value),
            Metric::MuscleMass => self.muscle_mass = Some(value),
            Metric::FatMass => self.fat_mass = Some(value),
            Metric::Bmi => self.bmi = Some(value),
            Metric::BodyFatPercentage => self.body_fat_percentage = Some(value),
            Metric::BasalMetabolicRate => self.basal_metabolic_rate = Some(value as u32),
            Metric::BodyWater => self.body_water = Some(value),
            Metric::Protein => self.protein = Some(value),
            Metric::LeanBodyMass => self.lean_body_mass = Some(value),
            Metric::VisceralFatLevel => self.visceral_fat_level = Some(value as u32),
            Metric::WaistHipRatio => self.waist_hip_ratio = Some(value),
        }
        true
    }

    /// Number of metric fields (height included) that were filled.
    pub fn filled_count(&self) -> usize {
        let metrics = metrics::METRICS
            .iter()
            .filter(|s| self.get(s.metric).is_some())
            .count();
        metrics + usize::from(self.height.is_some())
    }
}
