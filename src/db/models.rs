use serde::{Deserialize, Serialize};

/// Serving size assumed when the dataset leaves it blank.
pub const DEFAULT_SERVING_GRAMS: f64 = 100.0;

/// One row of the nutrition reference dataset. Nutrients are per serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionRecord {
    pub food_name: String,
    pub serving_size_grams: Option<f64>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub sugars: Option<f64>,
    pub sodium: Option<f64>,
    pub cholesterol: Option<f64>,
    pub trans_fat: Option<f64>,
}

impl NutritionRecord {
    /// A record with only a name.
    pub fn named(food_name: &str) -> Self {
        Self {
            food_name: food_name.to_string(),
            serving_size_grams: None,
            calories: None,
            protein: None,
            fat: None,
            carbs: None,
            sugars: None,
            sodium: None,
            cholesterol: None,
            trans_fat: None,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
    pub duplicates: usize,
}
