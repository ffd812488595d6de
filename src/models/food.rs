//! Food catalog types

use serde::{Deserialize, Serialize};

/// A food from the catalog
///
/// Macro values are per `serving_size` grams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Serving size in grams
    #[serde(default = "default_serving_size")]
    pub serving_size: f64,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub carbohydrate: f64,
    /// Dietary tags such as "vegan" or "gluten-free"
    #[serde(default)]
    pub dietary_options: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    /// Server-computed 0-10 quality score
    #[serde(default)]
    pub nutrition_score: f64,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_serving_size() -> f64 {
    100.0
}

impl Food {
    /// Scale factor for an amount in grams relative to the serving size
    pub fn portion_factor(&self, grams: f64) -> f64 {
        if self.serving_size <= 0.0 {
            return 0.0;
        }
        grams / self.serving_size
    }

    /// Whether the food carries a dietary tag (case-insensitive)
    pub fn has_dietary_option(&self, option: &str) -> bool {
        self.dietary_options
            .iter()
            .any(|o| o.eq_ignore_ascii_case(option))
    }
}

/// A user-submitted food awaiting moderation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodProposal {
    pub name: String,
    pub category: String,
    pub serving_size: f64,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrate: f64,
    #[serde(default)]
    pub dietary_options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
