//! Nutrition log and target types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::MealType;

/// Micronutrient amounts keyed by `"Name (unit)"`
pub type Micronutrients = BTreeMap<String, f64>;

/// A logged (eaten) food entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodLogEntry {
    pub id: u64,
    pub food_id: u64,
    #[serde(default)]
    pub food_name: String,
    pub serving_size: f64,
    #[serde(default = "default_unit")]
    pub serving_unit: String,
    pub meal_type: MealType,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbohydrates: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub micronutrients: Micronutrients,
    #[serde(default)]
    pub logged_at: Option<DateTime<Utc>>,
}

fn default_unit() -> String {
    "g".to_string()
}

/// A meal-plan item scheduled for a date but not yet eaten
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedEntry {
    pub food_id: u64,
    #[serde(default)]
    pub food_name: String,
    pub serving_size: f64,
    #[serde(default = "default_unit")]
    pub serving_unit: String,
    pub meal_type: MealType,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbohydrates: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub micronutrients: Micronutrients,
}

/// Body for logging a food to a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFoodLogEntry {
    pub food_id: u64,
    pub serving_size: f64,
    pub serving_unit: String,
    pub meal_type: MealType,
}

/// Hydration block computed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrationStatus {
    #[serde(default)]
    pub water_ml: f64,
    #[serde(default)]
    pub target_ml: f64,
    /// water / target as computed by the server
    #[serde(default)]
    pub ratio: Option<f64>,
    /// Contribution of hydration to the nutrition score
    #[serde(default)]
    pub score_adjustment: Option<f64>,
}

/// Aggregated totals for one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyNutritionLog {
    pub date: NaiveDate,
    #[serde(default)]
    pub total_calories: f64,
    #[serde(default)]
    pub total_protein: f64,
    #[serde(default)]
    pub total_carbohydrates: f64,
    #[serde(default)]
    pub total_fat: f64,
    #[serde(default)]
    pub micronutrients_summary: Micronutrients,
    #[serde(default)]
    pub food_logs: Vec<FoodLogEntry>,
    #[serde(default)]
    pub planned_entries: Vec<PlannedEntry>,
    #[serde(default)]
    pub water_ml: f64,
    /// Server-computed 0-10 score, hydration already applied
    #[serde(default)]
    pub nutrition_score: Option<f64>,
    #[serde(default)]
    pub hydration: Option<HydrationStatus>,
}

impl DailyNutritionLog {
    /// An empty log for a date with nothing recorded
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_calories: 0.0,
            total_protein: 0.0,
            total_carbohydrates: 0.0,
            total_fat: 0.0,
            micronutrients_summary: Micronutrients::new(),
            food_logs: Vec::new(),
            planned_entries: Vec::new(),
            water_ml: 0.0,
            nutrition_score: None,
            hydration: None,
        }
    }
}

/// Daily targets for the current user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionTargets {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbohydrates: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub micronutrients: Micronutrients,
}
