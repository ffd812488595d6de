//! Meal planning types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Meal slot for a planned or logged entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" | "snacks" => Ok(MealType::Snack),
            other => Err(format!(
                "Unknown meal type: {}. Use: breakfast, lunch, dinner, snack",
                other
            )),
        }
    }
}

/// One entry of a meal plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanEntry {
    pub food_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
    pub serving_size: f64,
    #[serde(default = "default_unit")]
    pub serving_unit: String,
    pub meal_type: MealType,
}

fn default_unit() -> String {
    "g".to_string()
}

/// A named, saved meal plan with totals cached by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMealPlan {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub entries: Vec<MealPlanEntry>,
    #[serde(default)]
    pub total_calories: f64,
    #[serde(default)]
    pub total_protein: f64,
    #[serde(default)]
    pub total_carbohydrates: f64,
    #[serde(default)]
    pub total_fat: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for creating a saved meal plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMealPlanRequest {
    pub name: String,
    pub entries: Vec<MealPlanEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_type_parse() {
        assert_eq!("Lunch".parse::<MealType>().unwrap(), MealType::Lunch);
        assert_eq!("snacks".parse::<MealType>().unwrap(), MealType::Snack);
        assert!("brunch".parse::<MealType>().is_err());
    }

    #[test]
    fn test_meal_type_serde() {
        let json = serde_json::to_string(&MealType::Dinner).unwrap();
        assert_eq!(json, "\"dinner\"");
    }

    #[test]
    fn test_entry_default_unit() {
        let entry: MealPlanEntry = serde_json::from_str(
            r#"{"food_id": 1, "serving_size": 120, "meal_type": "breakfast"}"#,
        )
        .unwrap();
        assert_eq!(entry.serving_unit, "g");
    }
}
